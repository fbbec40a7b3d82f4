//! # clustermon-core
//!
//! Supervision monitor for tests that run against a live cluster.
//!
//! A [`Monitor`] runs background test tasks while it watches an independent
//! stream of node liveness events, and reduces both sides to one verdict:
//! success, or the first real failure.
//!
//! - [`Monitor`] - Coordinator: registration, `wait` / `wait_e`
//! - [`ExpectedDeaths`] - Ledger of node deaths the test caused on purpose
//! - [`Outcome`] - First-error-wins cell
//! - [`TestHandle`], [`TestRun`] - The owning test's pass/fail and status
//! - [`EventSource`], [`MockEventSource`] - Where node events come from
//! - [`MonitorError`], [`TaskError`], [`FatalAbort`] - Error types
//!
//! # Example
//!
//! ```ignore
//! let run = Arc::new(TestRun::new("kill-one-node"));
//! let monitor = Monitor::new(&root, run, source, "local:1-3".parse()?);
//!
//! monitor.expect_death();
//! monitor.register_task(|cancel| async move {
//!     run_workload(cancel).await
//! });
//!
//! monitor.wait_e().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod handle;
mod ledger;
mod monitor;
mod outcome;
mod source;
mod supervisor;
mod watcher;

pub use config::MonitorConfig;
pub use error::{abort, BoxError, EventSourceError, FatalAbort, MonitorError, TaskError};
pub use handle::{TestHandle, TestRun};
pub use ledger::ExpectedDeaths;
pub use monitor::Monitor;
pub use outcome::Outcome;
pub use source::{EventSource, EventStream, MockEventSource};
pub use supervisor::TaskGroup;

pub use mon_types::{EventKind, NodeEvent, NodeId, NodeSet};
pub use tokio_util::sync::CancellationToken;
