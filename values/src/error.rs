use ibpc_str_buf::AllocationError;

use crate::TypeId;

/// Errors reported by value, string and list operations.
///
/// None of these are recovered from inside this crate. `TypeMismatch` in
/// particular points at a bug in the calling layer rather than bad data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Storage for a string or list node could not be obtained.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// An operation needed one shape and the value holds another.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: TypeId, found: TypeId },

    /// A list position outside `[0, len)`.
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A discriminant ordinal with no matching [`TypeId`].
    #[error("unknown type id {0}")]
    UnknownTypeId(u8),
}
