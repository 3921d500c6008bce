use core::fmt;

use crate::Error;

/// The discriminant of a [`Value`](crate::Value).
///
/// Ordinals are stable and may be persisted by callers:
///
/// | Variant   | Ordinal |
/// |-----------|---------|
/// | `Integer` | 0       |
/// | `Real`    | 1       |
/// | `String`  | 2       |
/// | `Boolean` | 3       |
/// | `List`    | 4       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeId {
    Integer = 0,
    Real = 1,
    String = 2,
    Boolean = 3,
    List = 4,
}
static_assertions::assert_eq_size!(TypeId, u8);

impl TypeId {
    /// Every discriminant, in ordinal order.
    pub const ALL: [TypeId; 5] = [
        TypeId::Integer,
        TypeId::Real,
        TypeId::String,
        TypeId::Boolean,
        TypeId::List,
    ];

    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            TypeId::Integer => "Integer",
            TypeId::Real => "Real",
            TypeId::String => "String",
            TypeId::Boolean => "Boolean",
            TypeId::List => "List",
        }
    }

    /// Scalars are copied by value; the other shapes own storage.
    pub const fn is_scalar(self) -> bool {
        matches!(self, TypeId::Integer | TypeId::Real | TypeId::Boolean)
    }
}

impl TryFrom<u8> for TypeId {
    type Error = Error;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        TypeId::ALL
            .get(usize::from(ordinal))
            .copied()
            .ok_or(Error::UnknownTypeId(ordinal))
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
