//! # clustermon-types
//!
//! Shared types for the clustermon test-cluster monitor.
//!
//! This crate provides the values that flow between the cluster, the monitor
//! and the harness:
//! - [`NodeId`], [`NodeSet`] - Which nodes a monitor is watching
//! - [`NodeEvent`], [`EventKind`] - Liveness events observed on those nodes
//! - [`ParseNodeSetError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod event;
mod node;

pub use event::{EventKind, NodeEvent};
pub use node::{NodeId, NodeSet, ParseNodeSetError};
