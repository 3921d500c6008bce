#![allow(unsafe_code)]

//! StrBuf: an owned, growable byte buffer with explicit capacity.
//!
//! `StrBuf` is the string payload of pseudocode values. It keeps:
//! - `capacity`: bytes of storage obtained from the allocator
//! - `len`: bytes of logical content, always `<= capacity`
//! - a [`GrowthPolicy`] deciding the next capacity when an append overflows
//!
//! Bytes in `[0, len)` are the content. Bytes in `[len, capacity)` are scratch
//! space for in-place growth and are never read.
//!
//! Every operation that may allocate is fallible and reports
//! [`AllocationError`]; on failure the buffer is left exactly as it was.
//!
//! ```
//! use ibpc_str_buf::StrBuf;
//!
//! let mut buf = StrBuf::with_capacity(4).unwrap();
//! buf.append(b"hello, ").unwrap();
//! buf.append_str("world").unwrap();
//! assert_eq!(buf.as_bytes(), b"hello, world");
//! assert_eq!(buf.capacity(), 16);
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod error;
mod policy;
pub mod tracking;

pub use error::AllocationError;
pub use policy::GrowthPolicy;

use alloc::alloc::handle_alloc_error;
use core::{
    alloc::Layout,
    cmp::Ordering,
    fmt::{self, Write},
    hash::{Hash, Hasher},
    ptr::{self, NonNull},
    slice,
    str::{self, Utf8Error},
};

use allocator_api2::alloc::{Allocator, Global};

/// Owned byte buffer with separate capacity and length.
///
/// See [crate-level docs](crate) for the growth and failure contract.
pub struct StrBuf<A: Allocator = Global> {
    ptr: NonNull<u8>,
    cap: usize,
    len: usize,
    policy: GrowthPolicy,
    alloc: A,
}

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
static_assertions::assert_eq_size!(StrBuf, [usize; 5]);

// The buffer owns its storage exclusively; sharing follows the allocator.
unsafe impl<A: Allocator + Send> Send for StrBuf<A> {}
unsafe impl<A: Allocator + Sync> Sync for StrBuf<A> {}

impl StrBuf {
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, AllocationError> {
        Self::with_capacity_in(capacity, Global)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AllocationError> {
        Self::from_bytes_in(bytes, Global)
    }
}

impl<A: Allocator> StrBuf<A> {
    /// Empty buffer with zero capacity. Does not allocate.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            len: 0,
            policy: GrowthPolicy::DEFAULT,
            alloc,
        }
    }

    /// Empty buffer with room for exactly `capacity` bytes.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self, AllocationError> {
        let mut buf = Self::new_in(alloc);
        buf.grow_to(capacity)?;
        Ok(buf)
    }

    /// Buffer holding a copy of `bytes`, with capacity `bytes.len()`.
    pub fn from_bytes_in(bytes: &[u8], alloc: A) -> Result<Self, AllocationError> {
        let mut buf = Self::with_capacity_in(bytes.len(), alloc)?;
        buf.append(bytes)?;
        Ok(buf)
    }

    /// Replace the growth policy used by later appends.
    pub fn with_policy(mut self, policy: GrowthPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// The logical content.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `cap` bytes (or dangling with `cap == 0`)
        // and the first `len` of them have been written.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The logical content as UTF-8 text.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        str::from_utf8(self.as_bytes())
    }

    /// Make room for `additional` more bytes, growing by the buffer's policy.
    pub fn reserve(&mut self, additional: usize) -> Result<(), AllocationError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(AllocationError::new(usize::MAX))?;
        if required <= self.cap {
            return Ok(());
        }
        let new_cap = self.policy.next_capacity(self.cap, required);
        self.grow_to(new_cap)
    }

    /// Copy `bytes` onto the end of the content.
    ///
    /// Grows first when the bytes do not fit. If growing fails nothing is
    /// written and the buffer keeps its previous content and capacity.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), AllocationError> {
        self.reserve(bytes.len())?;
        // SAFETY: `reserve` guarantees `len + bytes.len() <= cap`, and `bytes`
        // cannot alias our storage while we hold `&mut self`.
        unsafe {
            ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                self.ptr.as_ptr().add(self.len),
                bytes.len(),
            );
        }
        self.len += bytes.len();
        Ok(())
    }

    pub fn append_str(&mut self, s: &str) -> Result<(), AllocationError> {
        self.append(s.as_bytes())
    }

    pub fn push(&mut self, byte: u8) -> Result<(), AllocationError> {
        self.append(&[byte])
    }

    /// Shorten the content to `len` bytes. Keeps the capacity.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
        }
    }

    /// Drop all content. Keeps the capacity.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Free the storage. Equivalent to dropping the buffer.
    pub fn release(self) {
        drop(self)
    }

    fn current_layout(&self) -> Layout {
        // SAFETY: `cap` was accepted by `Layout::array::<u8>` when allocated.
        unsafe { Layout::from_size_align_unchecked(self.cap, 1) }
    }

    #[cold]
    fn grow_to(&mut self, new_cap: usize) -> Result<(), AllocationError> {
        if new_cap <= self.cap {
            return Ok(());
        }
        let new_layout =
            Layout::array::<u8>(new_cap).map_err(|_| AllocationError::new(new_cap))?;

        let block = if self.cap == 0 {
            self.alloc.allocate(new_layout)
        } else {
            // SAFETY: `ptr` was allocated by `alloc` with the current layout,
            // and the new layout is strictly larger with the same alignment.
            unsafe { self.alloc.grow(self.ptr, self.current_layout(), new_layout) }
        };

        match block {
            Ok(block) => {
                tracing::trace!(
                    old_capacity = self.cap,
                    new_capacity = new_cap,
                    len = self.len,
                    "string buffer grown"
                );
                self.ptr = block.cast();
                self.cap = new_cap;
                Ok(())
            }
            Err(_) => {
                tracing::debug!(requested = new_cap, "string buffer allocation failed");
                Err(AllocationError::new(new_cap))
            }
        }
    }
}

impl<A: Allocator + Clone> StrBuf<A> {
    /// Deep copy with independent storage sized to the content.
    pub fn try_clone(&self) -> Result<Self, AllocationError> {
        let mut copy = Self::with_capacity_in(self.len, self.alloc.clone())?.with_policy(self.policy);
        copy.append(self.as_bytes())?;
        Ok(copy)
    }
}

impl<A: Allocator> Drop for StrBuf<A> {
    fn drop(&mut self) {
        if self.cap != 0 {
            // SAFETY: `ptr` was allocated by `alloc` with exactly this layout.
            unsafe { self.alloc.deallocate(self.ptr, self.current_layout()) }
        }
    }
}

impl<A: Allocator + Clone> Clone for StrBuf<A> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => handle_alloc_error(err.layout()),
        }
    }
}

impl Default for StrBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<&str> for StrBuf {
    type Error = AllocationError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::from_bytes(s.as_bytes())
    }
}

impl<A: Allocator> AsRef<[u8]> for StrBuf<A> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<A: Allocator, B: Allocator> PartialEq<StrBuf<B>> for StrBuf<A> {
    fn eq(&self, other: &StrBuf<B>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: Allocator> Eq for StrBuf<A> {}

impl<A: Allocator> PartialEq<[u8]> for StrBuf<A> {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl<A: Allocator> PartialEq<str> for StrBuf<A> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: Allocator> PartialEq<&str> for StrBuf<A> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: Allocator> PartialOrd for StrBuf<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A: Allocator> Ord for StrBuf<A> {
    /// Lexicographic over the logical content only.
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl<A: Allocator> Hash for StrBuf<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl<A: Allocator> fmt::Debug for StrBuf<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Ok(s) => write!(f, "StrBuf({s:?}, len={}, cap={})", self.len, self.cap),
            Err(_) => write!(
                f,
                "StrBuf({:?}, len={}, cap={})",
                self.as_bytes(),
                self.len,
                self.cap
            ),
        }
    }
}

impl<A: Allocator> fmt::Display for StrBuf<A> {
    /// Writes the content as text, replacing invalid UTF-8 with U+FFFD.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.as_bytes().utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_char(char::REPLACEMENT_CHARACTER)?;
            }
        }
        Ok(())
    }
}

impl<A: Allocator> Write for StrBuf<A> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s).map_err(|_| fmt::Error)
    }
}
