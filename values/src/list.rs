//! Doubly-linked list of owned values.
//!
//! Nodes live in a slot table allocated from the list's allocator and link to
//! each other by slot index rather than by pointer:
//!
//! ```text
//! slots:  [ 0: Occupied ] [ 1: Vacant ] [ 2: Occupied ] [ 3: Occupied ]
//!              │  ▲                        │  ▲             │
//! head ────────┘  └──── prev ──────────────┘  └─── prev ────┘
//!                       next: 0 ──▶ 2 ──▶ 3 ◀── tail
//! free ──▶ 1
//! ```
//!
//! Removing a node turns its slot vacant and pushes it onto a free list, so
//! the next insertion reuses it instead of growing the table. Iteration always
//! follows `next` links from `head`, which is insertion order and never slot
//! order.

use core::{fmt, iter::FusedIterator, mem};

use allocator_api2::{
    alloc::{Allocator, Global},
    vec::Vec,
};
use ibpc_str_buf::AllocationError;

use crate::{Error, Value};

type Link = Option<usize>;

enum Slot<A: Allocator> {
    Occupied {
        prev: Link,
        next: Link,
        value: Value<A>,
    },
    Vacant {
        next_free: Link,
    },
}

/// An owning, doubly-linked sequence of [`Value`]s.
///
/// Every element is owned by its node. Dropping or [destroying](List::destroy)
/// the list drops every element, recursively, and releases the slot table.
pub struct List<A: Allocator = Global> {
    slots: Vec<Slot<A>, A>,
    head: Link,
    tail: Link,
    free: Link,
    len: usize,
}

impl List {
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<A: Allocator> List<A> {
    /// Empty list. Does not allocate.
    pub fn new_in(alloc: A) -> Self {
        Self {
            slots: Vec::new_in(alloc),
            head: None,
            tail: None,
            free: None,
            len: 0,
        }
    }

    /// Empty list with room for `capacity` nodes.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self, Error> {
        let mut list = Self::new_in(alloc);
        list.slots
            .try_reserve(capacity)
            .map_err(|_| slot_allocation_error::<A>(capacity))?;
        Ok(list)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn allocator(&self) -> &A {
        self.slots.allocator()
    }

    /// Link `value` after the current tail. Takes ownership of `value`.
    ///
    /// If the slot table cannot grow, the list is unchanged and `value` is
    /// dropped.
    pub fn push_back(&mut self, value: Value<A>) -> Result<(), Error> {
        let prev = self.tail;
        let idx = self.occupy(prev, None, value)?;
        match prev {
            Some(tail) => self.set_next(tail, Some(idx)),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        Ok(())
    }

    /// Link `value` before the current head. Takes ownership of `value`.
    pub fn push_front(&mut self, value: Value<A>) -> Result<(), Error> {
        let next = self.head;
        let idx = self.occupy(None, next, value)?;
        match next {
            Some(head) => self.set_prev(head, Some(idx)),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        Ok(())
    }

    pub fn pop_front(&mut self) -> Option<Value<A>> {
        let idx = self.head?;
        Some(self.unlink(idx))
    }

    pub fn pop_back(&mut self) -> Option<Value<A>> {
        let idx = self.tail?;
        Some(self.unlink(idx))
    }

    /// Unlink the element at `position` and hand it back to the caller.
    ///
    /// Fails with [`Error::IndexOutOfRange`] when `position >= len`, leaving
    /// the list untouched.
    pub fn remove(&mut self, position: usize) -> Result<Value<A>, Error> {
        let idx = self.slot_at(position).ok_or(Error::IndexOutOfRange {
            index: position,
            len: self.len,
        })?;
        let value = self.unlink(idx);
        tracing::trace!(position, len = self.len, "removed list element");
        Ok(value)
    }

    pub fn get(&self, position: usize) -> Option<&Value<A>> {
        self.slot_at(position).map(|idx| self.value(idx))
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut Value<A>> {
        let idx = self.slot_at(position)?;
        match &mut self.slots[idx] {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Vacant { .. } => unreachable!("link points at a vacant slot"),
        }
    }

    pub fn front(&self) -> Option<&Value<A>> {
        self.head.map(|idx| self.value(idx))
    }

    pub fn back(&self) -> Option<&Value<A>> {
        self.tail.map(|idx| self.value(idx))
    }

    /// Borrowing iterator from head to tail.
    ///
    /// The iterator holds a shared borrow of the list, so the list cannot be
    /// mutated until the iterator is dropped. Call `iter` again to restart.
    pub fn iter(&self) -> Iter<'_, A> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Drop every element. Keeps the slot table's storage.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
        self.tail = None;
        self.free = None;
        self.len = 0;
    }

    /// Drop every element and release the slot table.
    pub fn destroy(self) {
        drop(self)
    }

    fn occupy(&mut self, prev: Link, next: Link, value: Value<A>) -> Result<usize, Error> {
        let slot = Slot::Occupied { prev, next, value };
        let idx = match self.free {
            Some(idx) => {
                let Slot::Vacant { next_free } = mem::replace(&mut self.slots[idx], slot) else {
                    unreachable!("free list points at an occupied slot");
                };
                self.free = next_free;
                idx
            }
            None => {
                let wanted = self.slots.len() + 1;
                self.slots
                    .try_reserve(1)
                    .map_err(|_| slot_allocation_error::<A>(wanted))?;
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };
        self.len += 1;
        Ok(idx)
    }

    fn unlink(&mut self, idx: usize) -> Value<A> {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        let Slot::Occupied { prev, next, value } = mem::replace(&mut self.slots[idx], vacant) else {
            unreachable!("unlinking a vacant slot");
        };
        self.free = Some(idx);

        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }
        match next {
            Some(next) => self.set_prev(next, prev),
            None => self.tail = prev,
        }
        self.len -= 1;

        if self.len == 0 {
            // Only vacant slots remain; forget them rather than chain them.
            self.slots.clear();
            self.free = None;
        }
        value
    }

    /// Slot index of the element at `position`, walking from the nearer end.
    fn slot_at(&self, position: usize) -> Option<usize> {
        if position >= self.len {
            return None;
        }
        if position < self.len / 2 {
            let mut idx = self.head?;
            for _ in 0..position {
                idx = self.links(idx).1?;
            }
            Some(idx)
        } else {
            let mut idx = self.tail?;
            for _ in 0..(self.len - 1 - position) {
                idx = self.links(idx).0?;
            }
            Some(idx)
        }
    }

    fn links(&self, idx: usize) -> (Link, Link) {
        match &self.slots[idx] {
            Slot::Occupied { prev, next, .. } => (*prev, *next),
            Slot::Vacant { .. } => unreachable!("link points at a vacant slot"),
        }
    }

    fn value(&self, idx: usize) -> &Value<A> {
        match &self.slots[idx] {
            Slot::Occupied { value, .. } => value,
            Slot::Vacant { .. } => unreachable!("link points at a vacant slot"),
        }
    }

    fn set_next(&mut self, idx: usize, link: Link) {
        match &mut self.slots[idx] {
            Slot::Occupied { next, .. } => *next = link,
            Slot::Vacant { .. } => unreachable!("link points at a vacant slot"),
        }
    }

    fn set_prev(&mut self, idx: usize, link: Link) {
        match &mut self.slots[idx] {
            Slot::Occupied { prev, .. } => *prev = link,
            Slot::Vacant { .. } => unreachable!("link points at a vacant slot"),
        }
    }
}

impl<A: Allocator + Clone> List<A> {
    /// Deep copy: every element is cloned into storage of its own.
    pub fn try_clone(&self) -> Result<Self, Error> {
        let mut copy = Self::with_capacity_in(self.len, self.allocator().clone())?;
        for value in self {
            copy.push_back(value.try_clone()?)?;
        }
        Ok(copy)
    }
}

fn slot_allocation_error<A: Allocator>(slots: usize) -> Error {
    let bytes = mem::size_of::<Slot<A>>().saturating_mul(slots);
    tracing::debug!(slots, bytes, "list slot allocation failed");
    Error::Allocation(AllocationError::new(bytes))
}

impl Default for List {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator + Clone> Clone for List<A> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(Error::Allocation(err)) => alloc::alloc::handle_alloc_error(err.layout()),
            Err(err) => unreachable!("cloning a list cannot fail with {err}"),
        }
    }
}

impl<A: Allocator> PartialEq for List<A> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<A: Allocator> fmt::Debug for List<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, A: Allocator> IntoIterator for &'a List<A> {
    type Item = &'a Value<A>;
    type IntoIter = Iter<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<A: Allocator> IntoIterator for List<A> {
    type Item = Value<A>;
    type IntoIter = IntoIter<A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

/// Borrowing iterator over a [`List`], head to tail.
pub struct Iter<'a, A: Allocator = Global> {
    list: &'a List<A>,
    front: Link,
    back: Link,
    remaining: usize,
}

impl<A: Allocator> Clone for Iter<'_, A> {
    fn clone(&self) -> Self {
        Self {
            list: self.list,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, A: Allocator> Iterator for Iter<'a, A> {
    type Item = &'a Value<A>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front?;
        self.front = self.list.links(idx).1;
        self.remaining -= 1;
        Some(self.list.value(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<A: Allocator> DoubleEndedIterator for Iter<'_, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back?;
        self.back = self.list.links(idx).0;
        self.remaining -= 1;
        Some(self.list.value(idx))
    }
}

impl<A: Allocator> ExactSizeIterator for Iter<'_, A> {}

impl<A: Allocator> FusedIterator for Iter<'_, A> {}

/// Owning iterator over a [`List`], head to tail.
pub struct IntoIter<A: Allocator = Global> {
    list: List<A>,
}

impl<A: Allocator> Iterator for IntoIter<A> {
    type Item = Value<A>;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }
}

impl<A: Allocator> DoubleEndedIterator for IntoIter<A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.list.pop_back()
    }
}

impl<A: Allocator> ExactSizeIterator for IntoIter<A> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(list: &List) -> std::vec::Vec<i64> {
        list.iter().map(|v| v.as_integer().unwrap()).collect()
    }

    fn list_of(values: &[i64]) -> List {
        let mut list = List::new();
        for &v in values {
            list.push_back(Value::Integer(v)).unwrap();
        }
        list
    }

    #[test]
    fn test_push_back_and_front() {
        let mut list = List::new();
        list.push_back(Value::Integer(2)).unwrap();
        list.push_back(Value::Integer(3)).unwrap();
        list.push_front(Value::Integer(1)).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(ints(&list), [1, 2, 3]);
        assert_eq!(list.front(), Some(&Value::Integer(1)));
        assert_eq!(list.back(), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_iter_reverse() {
        let list = list_of(&[1, 2, 3, 4]);
        let rev: std::vec::Vec<_> = list.iter().rev().map(|v| v.as_integer().unwrap()).collect();
        assert_eq!(rev, [4, 3, 2, 1]);
    }

    #[test]
    fn test_iter_meets_in_middle() {
        let list = list_of(&[1, 2, 3]);
        let mut iter = list.iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next(), Some(&Value::Integer(1)));
        assert_eq!(iter.next_back(), Some(&Value::Integer(3)));
        assert_eq!(iter.next(), Some(&Value::Integer(2)));
        assert_eq!(iter.next_back(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_remove_head_middle_tail() {
        let mut list = list_of(&[10, 20, 30, 40, 50]);
        assert_eq!(list.remove(0).unwrap(), Value::Integer(10));
        assert_eq!(ints(&list), [20, 30, 40, 50]);
        assert_eq!(list.remove(3).unwrap(), Value::Integer(50));
        assert_eq!(ints(&list), [20, 30, 40]);
        assert_eq!(list.remove(1).unwrap(), Value::Integer(30));
        assert_eq!(ints(&list), [20, 40]);
        assert_eq!(list.front(), Some(&Value::Integer(20)));
        assert_eq!(list.back(), Some(&Value::Integer(40)));
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut list = list_of(&[1, 2, 3]);
        assert_eq!(
            list.remove(5),
            Err(Error::IndexOutOfRange { index: 5, len: 3 })
        );
        assert_eq!(
            list.remove(3),
            Err(Error::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(ints(&list), [1, 2, 3]);
    }

    #[test]
    fn test_vacant_slots_are_reused() {
        let mut list = list_of(&[1, 2, 3]);
        list.remove(1).unwrap();
        list.push_back(Value::Integer(4)).unwrap();
        assert_eq!(list.slots.len(), 3);
        assert_eq!(ints(&list), [1, 3, 4]);

        list.push_front(Value::Integer(0)).unwrap();
        assert_eq!(list.slots.len(), 4);
        assert_eq!(ints(&list), [0, 1, 3, 4]);
    }

    #[test]
    fn test_emptying_forgets_slots() {
        let mut list = list_of(&[1, 2]);
        list.pop_back();
        list.pop_front();
        assert!(list.is_empty());
        assert_eq!(list.slots.len(), 0);
        assert_eq!(list.free, None);
        list.push_back(Value::Integer(7)).unwrap();
        assert_eq!(ints(&list), [7]);
    }

    #[test]
    fn test_get_walks_from_either_end() {
        let list = list_of(&[0, 1, 2, 3, 4, 5, 6]);
        for i in 0..7 {
            assert_eq!(list.get(i), Some(&Value::Integer(i as i64)));
        }
        assert_eq!(list.get(7), None);
    }

    #[test]
    fn test_get_mut() {
        let mut list = list_of(&[1, 2, 3]);
        *list.get_mut(1).unwrap() = Value::Boolean(true);
        assert_eq!(list.get(1), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_into_iter_owned() {
        let list = list_of(&[1, 2, 3]);
        let mut iter = list.into_iter();
        assert_eq!(iter.next_back(), Some(Value::Integer(3)));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.next(), Some(Value::Integer(1)));
    }

    #[test]
    fn test_clear() {
        let mut list = list_of(&[1, 2, 3]);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.iter().next(), None);
        list.push_front(Value::Integer(9)).unwrap();
        assert_eq!(ints(&list), [9]);
    }

    #[test]
    fn test_debug() {
        let list = list_of(&[1, 2]);
        assert_eq!(format!("{list:?}"), "[Integer(1), Integer(2)]");
    }
}
