//! # clustermon-chaos
//!
//! Docker-backed pieces for running monitored tests against a real cluster.
//!
//! - [`ClusterHarness`] - Brings a Compose project up and down, injects node
//!   failures (kill, restart, pause), execs commands, collects logs
//! - [`DockerEventSource`] - Node liveness events from the Docker events API
//!
//! Tests that need a Docker daemon are `#[ignore = "requires docker"]`:
//!
//! ```text
//! cargo test -p clustermon-chaos -- --ignored
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod harness;

pub use harness::{ClusterHarness, ExecResult, HarnessError};
pub use source::{node_event, DockerEventSource, DockerSourceConfig};
