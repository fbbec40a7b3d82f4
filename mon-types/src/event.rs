//! Liveness events reported by a cluster.

use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// The node's process is up.
    Running,
    /// The node's process exited.
    Dead {
        /// Exit code, if the cluster reported one.
        exit_code: Option<i64>,
    },
    /// The cluster could not determine the node's state.
    Error {
        /// Description from the cluster.
        message: String,
    },
    /// Any other lifecycle action (pause, oom, restart, ...).
    Other {
        /// Raw action name.
        action: String,
    },
}

impl EventKind {
    /// Returns true if this event reports a node death.
    pub fn is_death(&self) -> bool {
        matches!(self, EventKind::Dead { .. })
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Running => f.write_str("running"),
            EventKind::Dead {
                exit_code: Some(code),
            } => write!(f, "dead (exit code {})", code),
            EventKind::Dead { exit_code: None } => f.write_str("dead"),
            EventKind::Error { message } => write!(f, "error: {}", message),
            EventKind::Other { action } => f.write_str(action),
        }
    }
}

/// A single event observed on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEvent {
    /// The node the event refers to.
    pub node: NodeId,
    /// What happened.
    #[serde(flatten)]
    pub kind: EventKind,
}

impl NodeEvent {
    /// Create an event.
    pub fn new(node: impl Into<NodeId>, kind: EventKind) -> Self {
        Self {
            node: node.into(),
            kind,
        }
    }

    /// A death event.
    pub fn dead(node: impl Into<NodeId>, exit_code: Option<i64>) -> Self {
        Self::new(node, EventKind::Dead { exit_code })
    }

    /// A running event.
    pub fn running(node: impl Into<NodeId>) -> Self {
        Self::new(node, EventKind::Running)
    }

    /// Returns true if this event reports a node death.
    pub fn is_death(&self) -> bool {
        self.kind.is_death()
    }
}

impl fmt::Display for NodeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.node, self.kind)
    }
}
