//! Allocation statistics for buffers and the containers built on them.
//!
//! [`TrackingAlloc`] wraps another allocator and counts every request that
//! passes through it. Clones share one set of counters, so a single tracker
//! can be handed to a buffer, a list, and every string inside that list, and
//! then asked afterwards whether anything is still alive:
//!
//! ```
//! use ibpc_str_buf::{StrBuf, tracking::TrackingAlloc};
//!
//! let alloc = TrackingAlloc::new();
//! let mut buf = StrBuf::with_capacity_in(1, alloc.clone()).unwrap();
//! for _ in 0..100 {
//!     buf.push(b'x').unwrap();
//! }
//! assert_eq!(alloc.stats().reallocations, 7);
//!
//! buf.release();
//! assert!(alloc.stats().is_balanced());
//! ```
//!
//! A byte limit can be set to make the allocator refuse requests, which is
//! how failure paths are exercised.
//!
//! The counters live behind an `Rc`, so a tracker is single-threaded.

use alloc::rc::Rc;
use core::{alloc::Layout, cell::Cell, ptr::NonNull};

use allocator_api2::alloc::{AllocError, Allocator, Global};

/// Snapshot of the counters kept by a [`TrackingAlloc`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Fresh allocations.
    pub allocations: usize,
    /// Blocks returned to the allocator.
    pub deallocations: usize,
    /// In-place or moving growths of an existing block.
    pub reallocations: usize,
    /// Bytes currently handed out.
    pub live_bytes: usize,
    /// High-water mark of `live_bytes`.
    pub peak_bytes: usize,
}

impl AllocStats {
    /// Blocks allocated and not yet returned.
    pub fn live_allocations(&self) -> usize {
        self.allocations - self.deallocations
    }

    /// Every block was returned.
    pub fn is_balanced(&self) -> bool {
        self.live_allocations() == 0 && self.live_bytes == 0
    }
}

#[derive(Debug, Default)]
struct State {
    stats: Cell<AllocStats>,
    limit: Cell<Option<usize>>,
}

/// Allocator wrapper that counts allocations, deallocations and growths.
#[derive(Debug, Clone, Default)]
pub struct TrackingAlloc<A: Allocator = Global> {
    inner: A,
    state: Rc<State>,
}

impl TrackingAlloc {
    pub fn new() -> Self {
        Self::wrap(Global)
    }
}

impl<A: Allocator> TrackingAlloc<A> {
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            state: Rc::new(State::default()),
        }
    }

    /// Refuse any request that would push live bytes above `bytes`.
    pub fn with_limit(self, bytes: usize) -> Self {
        self.set_limit(Some(bytes));
        self
    }

    /// Change the byte limit for this tracker and all of its clones.
    pub fn set_limit(&self, limit: Option<usize>) {
        self.state.limit.set(limit);
    }

    pub fn stats(&self) -> AllocStats {
        self.state.stats.get()
    }

    fn admit(&self, extra: usize) -> Result<(), AllocError> {
        let Some(limit) = self.state.limit.get() else {
            return Ok(());
        };
        match self.stats().live_bytes.checked_add(extra) {
            Some(total) if total <= limit => Ok(()),
            _ => Err(AllocError),
        }
    }

    fn record(&self, update: impl FnOnce(&mut AllocStats)) {
        let mut stats = self.state.stats.get();
        update(&mut stats);
        stats.peak_bytes = stats.peak_bytes.max(stats.live_bytes);
        self.state.stats.set(stats);
    }
}

unsafe impl<A: Allocator> Allocator for TrackingAlloc<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        self.admit(layout.size())?;
        let block = self.inner.allocate(layout)?;
        self.record(|stats| {
            stats.allocations += 1;
            stats.live_bytes += layout.size();
        });
        Ok(block)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.inner.deallocate(ptr, layout) };
        self.record(|stats| {
            stats.deallocations += 1;
            stats.live_bytes -= layout.size();
        });
    }

    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        let extra = new_layout.size() - old_layout.size();
        self.admit(extra)?;
        let block = unsafe { self.inner.grow(ptr, old_layout, new_layout) }?;
        self.record(|stats| {
            stats.reallocations += 1;
            stats.live_bytes += extra;
        });
        Ok(block)
    }
}
