//! Ring-signal latch.
//!
//! A one-bit latch set by the poll client whenever the server delivers a
//! non-whitespace payload, and cleared exactly once by the service loop
//! when it dispatches the strike.  Duplicate sets before consumption
//! collapse into one pending signal.
//!
//! The atomic keeps the single-writer (transport side) / single-reader
//! (service loop) protocol sound even when the transport delivers data
//! from a worker thread.

use core::sync::atomic::{AtomicBool, Ordering};

/// Latched "ring now" signal.
#[derive(Debug, Default)]
pub struct RingLatch {
    pending: AtomicBool,
}

impl RingLatch {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Latch a pending ring.  Idempotent — a second set before the next
    /// [`consume`](Self::consume) is absorbed.
    pub fn set(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Non-destructive read, for diagnostics and tests.
    pub fn is_set(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Atomically take the pending signal.  Returns `true` at most once
    /// per [`set`](Self::set); the latch reads unset immediately after.
    pub fn consume(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}
