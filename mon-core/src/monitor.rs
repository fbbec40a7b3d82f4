//! Monitor coordinator.
//!
//! Lifecycle:
//!
//! ```text
//! Idle ──wait()/wait_e()──► Running ──both branches joined──► Terminated
//!   │                                                             ▲
//!   └──────────── test already failed (AlreadyFailed) ────────────┘
//! ```
//!
//! While running, two branches race:
//! - the task join (skipped when no task was registered)
//! - the event watcher
//!
//! Both branches, and every task, share one scope token and one verdict
//! [`Outcome`]. A failure is recorded into the verdict before the scope is
//! cancelled, so a branch woken by that cancellation can never overwrite the
//! root cause with its own shutdown error. A failing task settles the
//! verdict on its own, without waiting for its siblings to wind down.

use crate::config::MonitorConfig;
use crate::error::{BoxError, MonitorError};
use crate::handle::TestHandle;
use crate::ledger::ExpectedDeaths;
use crate::outcome::Outcome;
use crate::source::EventSource;
use crate::supervisor::TaskGroup;
use crate::watcher;
use mon_types::NodeSet;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Supervises background tasks against a stream of node events.
///
/// Created once per test run. `wait` / `wait_e` consume the monitor, so it
/// cannot be reused after it terminates. Dropping a monitor cancels its
/// scope.
pub struct Monitor<H: TestHandle + ?Sized, S: EventSource> {
    handle: Arc<H>,
    source: S,
    nodes: NodeSet,
    scope: CancellationToken,
    verdict: Arc<Outcome<MonitorError>>,
    tasks: TaskGroup,
    deaths: ExpectedDeaths,
    config: MonitorConfig,
    _teardown: DropGuard,
}

impl<H: TestHandle + ?Sized, S: EventSource> Monitor<H, S> {
    /// Create a monitor for `nodes`, scoped under `parent`.
    pub fn new(parent: &CancellationToken, handle: Arc<H>, source: S, nodes: NodeSet) -> Self {
        Self::with_config(parent, handle, source, nodes, MonitorConfig::default())
    }

    /// Create a monitor with explicit configuration.
    pub fn with_config(
        parent: &CancellationToken,
        handle: Arc<H>,
        source: S,
        nodes: NodeSet,
        config: MonitorConfig,
    ) -> Self {
        let scope = parent.child_token();
        let verdict = Arc::new(Outcome::new());
        Self {
            handle,
            source,
            nodes,
            tasks: TaskGroup::new(scope.clone(), Arc::clone(&verdict)),
            verdict,
            deaths: ExpectedDeaths::new(config.expected_deaths),
            _teardown: scope.clone().drop_guard(),
            scope,
            config,
        }
    }

    /// Get the monitored node set.
    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    /// Number of tasks registered so far.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Deaths still tolerated (may be negative).
    pub fn expected_deaths(&self) -> i32 {
        self.deaths.remaining()
    }

    /// Start `task` in the background. Returns immediately.
    ///
    /// The task receives a token that is cancelled when the monitor winds
    /// down or another task fails.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn register_task<F, Fut, E>(&self, task: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.tasks.spawn(Arc::clone(&self.handle), task);
    }

    /// Like [`register_task`](Self::register_task), but the task gets its own
    /// child token. Cancelling the returned token stops only this task.
    pub fn register_cancellable_task<F, Fut, E>(&self, task: F) -> CancellationToken
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let own = self.tasks.token().child_token();
        let token = own.clone();
        self.register_task(move |_group| task(token));
        own
    }

    /// Tolerate one more node death.
    pub fn expect_death(&self) {
        self.expect_deaths(1);
    }

    /// Tolerate `count` more node deaths.
    pub fn expect_deaths(&self, count: i32) {
        self.deaths.expect(count);
    }

    /// Drop all pending death tolerance.
    pub fn reset_deaths(&self) {
        self.deaths.reset();
    }

    /// Run until both branches finish and escalate a failure to the test.
    ///
    /// Returns silently if the test had already failed.
    pub async fn wait(self) {
        if self.handle.failed() {
            return;
        }
        let handle = Arc::clone(&self.handle);
        if let Err(err) = self.wait_e().await {
            handle.fatal(err.to_string());
        }
    }

    /// Run until both branches finish and return the first failure.
    pub async fn wait_e(self) -> Result<(), MonitorError> {
        if self.handle.failed() {
            return Err(MonitorError::AlreadyFailed);
        }

        tracing::info!(
            nodes = %self.nodes,
            tasks = self.tasks.len(),
            expected_deaths = self.deaths.remaining(),
            "monitor started"
        );

        let join_tasks = async {
            if self.tasks.is_empty() {
                return;
            }
            let _cancel = self.scope.clone().drop_guard();
            self.tasks.join().await;
        };

        let watch_events = async {
            let _cancel = self.scope.clone().drop_guard();
            let result = watcher::watch(
                &self.source,
                &self.nodes,
                &self.deaths,
                &self.scope,
                self.config.log_events,
            )
            .await;
            if let Err(err) = result {
                settle(&self.verdict, err);
            }
        };

        tokio::join!(join_tasks, watch_events);

        let result = self.verdict.result();
        match &result {
            Ok(()) => tracing::info!(nodes = %self.nodes, "monitor finished"),
            Err(err) => tracing::warn!(nodes = %self.nodes, "monitor finished: {}", err),
        }
        result
    }
}

/// Record `err` as the verdict unless an earlier branch already won.
fn settle(outcome: &Outcome<MonitorError>, err: MonitorError) {
    if let Err(lost) = outcome.record(err) {
        tracing::debug!("monitor error discarded: {}", lost);
    }
}
