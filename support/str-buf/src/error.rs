use core::alloc::Layout;

use thiserror::Error;

/// Storage for a buffer could not be obtained.
///
/// Returned when the allocator refuses a request, or when the requested size
/// cannot be described by a [`Layout`] on this platform. The buffer that
/// reported it is left exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("failed to allocate {requested} bytes")]
pub struct AllocationError {
    requested: usize,
}

impl AllocationError {
    pub const fn new(requested: usize) -> Self {
        Self { requested }
    }

    /// Number of bytes the failed request asked for.
    pub const fn requested(&self) -> usize {
        self.requested
    }

    /// Byte layout of the failed request, for `handle_alloc_error`.
    pub fn layout(&self) -> Layout {
        Layout::from_size_align(self.requested, 1).unwrap_or_else(|_| Layout::new::<u8>())
    }
}
