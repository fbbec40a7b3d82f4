//! Ledger of node deaths the test caused on purpose.

use std::sync::atomic::{AtomicI32, Ordering};

/// Counts node deaths that are still to be tolerated.
///
/// The counter may go negative while deaths race with `expect` calls. Only
/// the value right after a decrement decides whether a death is tolerated.
#[derive(Debug, Default)]
pub struct ExpectedDeaths {
    remaining: AtomicI32,
}

impl ExpectedDeaths {
    /// Create a ledger tolerating `initial` deaths.
    pub fn new(initial: i32) -> Self {
        Self {
            remaining: AtomicI32::new(initial),
        }
    }

    /// Tolerate `count` more deaths. Additive across calls.
    pub fn expect(&self, count: i32) {
        self.update(|n| n.saturating_add(count));
    }

    /// Forget all pending tolerance.
    pub fn reset(&self) {
        self.remaining.store(0, Ordering::SeqCst);
    }

    /// Record one death. Returns true if it was expected.
    pub fn consume(&self) -> bool {
        self.update(|n| n.saturating_sub(1)) > 0
    }

    /// Current counter value.
    pub fn remaining(&self) -> i32 {
        self.remaining.load(Ordering::SeqCst)
    }

    /// Apply `f` atomically and return the previous value.
    fn update(&self, f: impl Fn(i32) -> i32) -> i32 {
        match self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(f(n)))
        {
            Ok(prev) | Err(prev) => prev,
        }
    }
}
