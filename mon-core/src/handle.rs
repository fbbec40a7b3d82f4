//! The owning test, as seen by the monitor.

use crate::error::abort;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// What the monitor needs from the test that owns it.
pub trait TestHandle: Send + Sync + 'static {
    /// Returns true if the test has already been marked failed.
    fn failed(&self) -> bool;

    /// Fail the test and unwind.
    ///
    /// Implementations are expected to end in [`abort`], so that a call made
    /// from inside a monitor task is caught by the task wrapper.
    fn fatal(&self, message: String) -> !;

    /// Publish a human-readable status for the current worker.
    fn worker_status(&self, status: &str);

    /// Clear the worker status.
    fn clear_worker_status(&self) {
        self.worker_status("");
    }
}

/// A named test run that tracks failure and the latest worker status.
#[derive(Debug, Default)]
pub struct TestRun {
    name: String,
    failed: AtomicBool,
    status: Mutex<Option<String>>,
}

impl TestRun {
    /// Create a passing test run.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Get the test name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mark the test failed without unwinding.
    pub fn fail(&self, message: &str) {
        tracing::error!(test = %self.name, "{}", message);
        self.failed.store(true, Ordering::SeqCst);
    }

    /// Latest published worker status.
    pub fn status(&self) -> Option<String> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl TestHandle for TestRun {
    fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn fatal(&self, message: String) -> ! {
        self.fail(&message);
        abort(message)
    }

    fn worker_status(&self, status: &str) {
        let mut slot = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        if status.is_empty() {
            *slot = None;
        } else {
            tracing::debug!(test = %self.name, "worker status: {}", status);
            *slot = Some(status.to_string());
        }
    }
}
