//! Active-iterator counter.
//!
//! Single-threaded reentrancy guard that detects structural mutation of a
//! table while one of its cursors is suspended, e.g. when the interpreter
//! runs a callback mid-loop that re-enters the same table. Several guards
//! may be live at once; read-only traversals never conflict with each
//! other. This is not a lock: nothing ever waits on it.

use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Per-table counter. Guards hold a shared handle to it, so a cursor can
/// release its registration on drop without borrowing the table.
#[derive(Debug, Default)]
pub struct IterCounter {
    active: Arc<AtomicU32>,
}

impl IterCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one active iterator. Released when the guard drops.
    #[inline]
    pub fn enter(&self) -> IterGuard {
        self.active.fetch_add(1, Ordering::Relaxed);
        IterGuard {
            active: Arc::clone(&self.active),
        }
    }

    /// Number of live guards.
    #[inline]
    pub fn active(&self) -> u32 {
        self.active.load(Ordering::Relaxed)
    }

    /// Identity of this counter, valid for as long as any copy is held.
    pub fn id(&self) -> CounterId {
        CounterId(Arc::clone(&self.active))
    }

    /// Whether `id` was taken from this counter.
    #[inline]
    pub fn is(&self, id: &CounterId) -> bool {
        Arc::ptr_eq(&self.active, &id.0)
    }
}

/// Opaque identity of an [`IterCounter`]. Holding it does not register
/// an iterator.
#[derive(Debug, Clone)]
pub struct CounterId(Arc<AtomicU32>);

/// RAII registration returned by [`IterCounter::enter`].
#[derive(Debug)]
pub struct IterGuard {
    active: Arc<AtomicU32>,
}

impl Drop for IterGuard {
    fn drop(&mut self) {
        let prev = self.active.fetch_sub(1, Ordering::Relaxed);
        debug_assert!(prev > 0, "iterator counter underflow");
    }
}
