//! Task supervisor: runs monitored tasks against a shared verdict.
//!
//! Every task runs inside a wrapper that:
//! - hands the task the monitor scope token
//! - converts panics (including the [`FatalAbort`](crate::FatalAbort)
//!   sentinel) into a [`TaskError`]
//! - clears the worker status on every exit path
//!
//! A failing task records its error into the verdict first and then
//! cancels the scope, so every branch that wakes on that cancellation finds
//! the verdict already settled. Every error is still logged.

use crate::error::{BoxError, MonitorError, TaskError};
use crate::handle::TestHandle;
use crate::outcome::Outcome;
use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// A group of concurrently running tasks sharing one scope and one verdict.
#[derive(Debug)]
pub struct TaskGroup {
    scope: CancellationToken,
    tracker: TaskTracker,
    started: AtomicUsize,
    verdict: Arc<Outcome<MonitorError>>,
}

impl TaskGroup {
    /// Create an empty group. Tasks observe `scope`, and the first task
    /// error is recorded into `verdict` before `scope` is cancelled.
    pub fn new(scope: CancellationToken, verdict: Arc<Outcome<MonitorError>>) -> Self {
        Self {
            scope,
            tracker: TaskTracker::new(),
            started: AtomicUsize::new(0),
            verdict,
        }
    }

    /// Cancellation token handed to every task.
    pub fn token(&self) -> &CancellationToken {
        &self.scope
    }

    /// Number of tasks started so far.
    pub fn len(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Returns true if no task was ever started.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start `task` on the Tokio runtime. Returns immediately.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn<H, F, Fut, E>(&self, handle: Arc<H>, task: F)
    where
        H: TestHandle + ?Sized,
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let id = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        let scope = self.scope.clone();
        let verdict = Arc::clone(&self.verdict);

        self.tracker.spawn(async move {
            let Err(err) = run_task(handle.as_ref(), scope.clone(), task).await else {
                tracing::debug!(task = id, "monitor task finished");
                return;
            };

            tracing::warn!(task = id, "monitor task failed: {}", err);
            if let Err(lost) = verdict.record(MonitorError::Task(err)) {
                tracing::debug!(task = id, "monitor error discarded: {}", lost);
            }
            scope.cancel();
        });
    }

    /// Wait for every started task to finish.
    ///
    /// Task errors are already in the verdict by the time this returns.
    pub async fn join(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

/// Run one task to completion, containing panics.
async fn run_task<H, F, Fut, E>(
    handle: &H,
    token: CancellationToken,
    task: F,
) -> Result<(), TaskError>
where
    H: TestHandle + ?Sized,
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Into<BoxError>,
{
    let _status = StatusReset(handle);

    match AssertUnwindSafe(async move { task(token).await })
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(TaskError::failed(err)),
        Err(payload) => Err(TaskError::from_panic(payload)),
    }
}

/// Clears the worker status when dropped.
struct StatusReset<'a, H: TestHandle + ?Sized>(&'a H);

impl<H: TestHandle + ?Sized> Drop for StatusReset<'_, H> {
    fn drop(&mut self) {
        self.0.clear_worker_status();
    }
}
