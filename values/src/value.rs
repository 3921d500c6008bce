use core::{cmp::Ordering, fmt};

use allocator_api2::alloc::{Allocator, Global};
use ibpc_str_buf::StrBuf;

use crate::{Error, List, TypeId};

/// A runtime value of the pseudocode language.
///
/// The variant is the discriminant and the payload travels with it, so a
/// value can never claim one shape while holding another's data. `String`
/// and `List` payloads are owned: moving a value moves its storage, and
/// [`try_clone`](Value::try_clone) copies it deeply.
///
/// Typed accessors check the shape and report [`Error::TypeMismatch`]
/// instead of reinterpreting the payload:
///
/// ```
/// use ibpc_values::{Error, TypeId, Value};
///
/// let v: Value = Value::integer(42);
/// assert_eq!(v.as_integer(), Ok(42));
/// assert_eq!(
///     v.as_boolean(),
///     Err(Error::TypeMismatch { expected: TypeId::Boolean, found: TypeId::Integer }),
/// );
/// ```
pub enum Value<A: Allocator = Global> {
    Integer(i64),
    Real(f64),
    String(StrBuf<A>),
    Boolean(bool),
    List(List<A>),
}

static_assertions::assert_impl_all!(Value: Send, Sync);

impl Value {
    /// String value holding a copy of `s`, on the global allocator.
    pub fn string_from(s: &str) -> Result<Self, Error> {
        Ok(Value::String(StrBuf::from_bytes(s.as_bytes())?))
    }

    /// Empty list value on the global allocator.
    pub fn empty_list() -> Self {
        Value::List(List::new())
    }
}

impl<A: Allocator> Value<A> {
    pub const fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    pub const fn real(value: f64) -> Self {
        Value::Real(value)
    }

    pub const fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    /// Wrap `buf` as a value. The buffer is moved in; the value now owns it.
    pub fn string(buf: StrBuf<A>) -> Self {
        Value::String(buf)
    }

    /// Wrap `list` as a value. The list is moved in; the value now owns it.
    pub fn list(list: List<A>) -> Self {
        Value::List(list)
    }

    pub fn empty_list_in(alloc: A) -> Self {
        Value::List(List::new_in(alloc))
    }

    pub fn type_id(&self) -> TypeId {
        match self {
            Value::Integer(_) => TypeId::Integer,
            Value::Real(_) => TypeId::Real,
            Value::String(_) => TypeId::String,
            Value::Boolean(_) => TypeId::Boolean,
            Value::List(_) => TypeId::List,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_id().name()
    }

    pub fn as_integer(&self) -> Result<i64, Error> {
        match self {
            Value::Integer(v) => Ok(*v),
            _ => Err(self.mismatch(TypeId::Integer)),
        }
    }

    pub fn as_real(&self) -> Result<f64, Error> {
        match self {
            Value::Real(v) => Ok(*v),
            _ => Err(self.mismatch(TypeId::Real)),
        }
    }

    pub fn as_boolean(&self) -> Result<bool, Error> {
        match self {
            Value::Boolean(v) => Ok(*v),
            _ => Err(self.mismatch(TypeId::Boolean)),
        }
    }

    pub fn as_string(&self) -> Result<&StrBuf<A>, Error> {
        match self {
            Value::String(buf) => Ok(buf),
            _ => Err(self.mismatch(TypeId::String)),
        }
    }

    pub fn as_string_mut(&mut self) -> Result<&mut StrBuf<A>, Error> {
        match self {
            Value::String(buf) => Ok(buf),
            _ => Err(self.mismatch(TypeId::String)),
        }
    }

    pub fn as_list(&self) -> Result<&List<A>, Error> {
        match self {
            Value::List(list) => Ok(list),
            _ => Err(self.mismatch(TypeId::List)),
        }
    }

    pub fn as_list_mut(&mut self) -> Result<&mut List<A>, Error> {
        match self {
            Value::List(list) => Ok(list),
            _ => Err(self.mismatch(TypeId::List)),
        }
    }

    /// Append `element` to this list value, taking ownership of it.
    pub fn push_back(&mut self, element: Value<A>) -> Result<(), Error> {
        self.as_list_mut()?.push_back(element)
    }

    /// Prepend `element` to this list value, taking ownership of it.
    pub fn push_front(&mut self, element: Value<A>) -> Result<(), Error> {
        self.as_list_mut()?.push_front(element)
    }

    /// Unlink the element at `position` of this list value and return it.
    pub fn remove(&mut self, position: usize) -> Result<Value<A>, Error> {
        self.as_list_mut()?.remove(position)
    }

    /// Release any owned payload. Equivalent to dropping the value.
    pub fn destroy(self) {
        drop(self)
    }

    fn mismatch(&self, expected: TypeId) -> Error {
        let found = self.type_id();
        tracing::debug!(%expected, %found, "value type mismatch");
        Error::TypeMismatch { expected, found }
    }
}

impl<A: Allocator + Clone> Value<A> {
    /// Deep copy. Strings get fresh storage, lists are copied element by
    /// element, recursively.
    pub fn try_clone(&self) -> Result<Self, Error> {
        Ok(match self {
            Value::Integer(v) => Value::Integer(*v),
            Value::Real(v) => Value::Real(*v),
            Value::Boolean(v) => Value::Boolean(*v),
            Value::String(buf) => Value::String(buf.try_clone()?),
            Value::List(list) => Value::List(list.try_clone()?),
        })
    }
}

impl<A: Allocator + Clone> Clone for Value<A> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(Error::Allocation(err)) => alloc::alloc::handle_alloc_error(err.layout()),
            Err(err) => unreachable!("cloning a value cannot fail with {err}"),
        }
    }
}

impl<A: Allocator> From<i64> for Value<A> {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl<A: Allocator> From<f64> for Value<A> {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl<A: Allocator> From<bool> for Value<A> {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl<A: Allocator> From<StrBuf<A>> for Value<A> {
    fn from(buf: StrBuf<A>) -> Self {
        Value::String(buf)
    }
}

impl<A: Allocator> From<List<A>> for Value<A> {
    fn from(list: List<A>) -> Self {
        Value::List(list)
    }
}

impl<A: Allocator> PartialEq for Value<A> {
    /// Same shape and equal payload. Reals compare as IEEE-754 (NaN is never
    /// equal to anything).
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl<A: Allocator> PartialOrd for Value<A> {
    /// Ordering within one shape. Values of different shapes are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
            (Value::Real(a), Value::Real(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.partial_cmp(b),
            (Value::List(a), Value::List(b)) => a.iter().partial_cmp(b.iter()),
            _ => None,
        }
    }
}

impl<A: Allocator> fmt::Debug for Value<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "Integer({v})"),
            Value::Real(v) => write!(f, "Real({v:?})"),
            Value::Boolean(v) => write!(f, "Boolean({v})"),
            Value::String(buf) => match buf.as_str() {
                Ok(s) => write!(f, "String({s:?})"),
                Err(_) => write!(f, "String({:?})", buf.as_bytes()),
            },
            Value::List(list) => write!(f, "List({list:?})"),
        }
    }
}

impl<A: Allocator> fmt::Display for Value<A> {
    /// Human-readable rendering for debugging output:
    /// `42`, `2.5`, `true`, `text`, `[1, "a", [true]]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v:?}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::String(buf) => write!(f, "{buf}"),
            Value::List(list) => {
                f.write_str("[")?;
                for (i, element) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match element {
                        Value::String(buf) => write!(f, "\"{buf}\"")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ids() {
        let values: [Value; 5] = [
            Value::integer(1),
            Value::real(1.0),
            Value::string_from("s").unwrap(),
            Value::boolean(true),
            Value::empty_list(),
        ];
        let ids: std::vec::Vec<TypeId> = values.iter().map(Value::type_id).collect();
        assert_eq!(ids, TypeId::ALL);
    }

    #[test]
    fn test_real_bits_preserved() {
        let bits = 0x7ff8_dead_beef_0001_u64;
        let v: Value = Value::real(f64::from_bits(bits));
        assert_eq!(v.as_real().unwrap().to_bits(), bits);
    }

    #[test]
    fn test_nan_not_equal() {
        let v: Value = Value::real(f64::NAN);
        assert_ne!(v, v.clone());
        assert_eq!(v.partial_cmp(&v), None);
    }

    #[test]
    fn test_cross_shape_never_equal() {
        let one: Value = Value::integer(1);
        assert_ne!(one, Value::real(1.0));
        assert_ne!(one, Value::boolean(true));
        assert_eq!(one.partial_cmp(&Value::real(1.0)), None);
    }

    #[test]
    fn test_ordering_within_shape() {
        assert!(Value::<Global>::integer(-3) < Value::integer(2));
        assert!(Value::<Global>::boolean(false) < Value::boolean(true));
        assert!(Value::string_from("abc").unwrap() < Value::string_from("abd").unwrap());
    }

    #[test]
    fn test_list_ordering_is_lexicographic() {
        let mut short = Value::empty_list();
        short.push_back(Value::integer(1)).unwrap();
        let mut long = short.clone();
        long.push_back(Value::integer(0)).unwrap();
        assert!(short < long);
    }

    #[test]
    fn test_push_onto_non_list() {
        let mut v: Value = Value::boolean(false);
        assert_eq!(
            v.push_back(Value::integer(1)),
            Err(Error::TypeMismatch {
                expected: TypeId::List,
                found: TypeId::Boolean,
            })
        );
        assert_eq!(v, Value::boolean(false));
    }

    #[test]
    fn test_debug() {
        let mut v = Value::empty_list();
        v.push_back(Value::string_from("hi").unwrap()).unwrap();
        v.push_back(Value::real(2.0)).unwrap();
        assert_eq!(format!("{v:?}"), "List([String(\"hi\"), Real(2.0)])");
    }

    #[test]
    fn test_display() {
        let mut inner = Value::empty_list();
        inner.push_back(Value::boolean(true)).unwrap();
        let mut v = Value::empty_list();
        v.push_back(Value::integer(1)).unwrap();
        v.push_back(Value::string_from("a").unwrap()).unwrap();
        v.push_back(Value::real(0.5)).unwrap();
        v.push_back(inner).unwrap();
        assert_eq!(v.to_string(), "[1, \"a\", 0.5, [true]]");
        assert_eq!(Value::string_from("plain").unwrap().to_string(), "plain");
    }

    #[test]
    fn test_logging_does_not_disturb_results() {
        crate::test_utils::init_test_logging();
        let v: Value = Value::integer(3);
        assert!(v.as_list().is_err());
    }
}
