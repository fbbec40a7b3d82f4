//! Node identity and node-set selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while parsing a [`NodeSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseNodeSetError {
    /// The cluster part before `:` was empty.
    #[error("node set has an empty cluster name")]
    EmptyCluster,

    /// A node entry between commas was empty.
    #[error("node set has an empty node entry")]
    EmptyNode,

    /// A numeric range was malformed or descending.
    #[error("invalid node range: {0}")]
    InvalidRange(String),
}

/// Identifies one node of a cluster.
///
/// Either a service name (`relay`, `client-a`) or a numeric index (`3`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a NodeId from any name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the node name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for NodeId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<u32> for NodeId {
    fn from(index: u32) -> Self {
        Self(index.to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The set of nodes a monitor watches.
///
/// An empty node list selects every node of the cluster.
///
/// Textual form is `cluster` or `cluster:a,b,1-3`, where a numeric range
/// `lo-hi` expands to every index in between (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSet {
    cluster: String,
    nodes: Vec<NodeId>,
}

impl NodeSet {
    /// Select every node of `cluster`.
    pub fn all(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            nodes: Vec::new(),
        }
    }

    /// Select specific nodes of `cluster`.
    pub fn new<I, N>(cluster: impl Into<String>, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        Self {
            cluster: cluster.into(),
            nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }

    /// Select nodes `lo..=hi` of `cluster` by index.
    pub fn range(cluster: impl Into<String>, lo: u32, hi: u32) -> Self {
        Self::new(cluster, lo..=hi)
    }

    /// Get the cluster name.
    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Get the explicitly selected nodes (empty = all).
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Returns true if every node of the cluster is selected.
    pub fn is_all(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if `node` is part of this set.
    pub fn contains(&self, node: &NodeId) -> bool {
        self.is_all() || self.nodes.contains(node)
    }
}

impl fmt::Display for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cluster)?;
        if !self.nodes.is_empty() {
            let names: Vec<&str> = self.nodes.iter().map(NodeId::as_str).collect();
            write!(f, ":{}", names.join(","))?;
        }
        Ok(())
    }
}

impl FromStr for NodeSet {
    type Err = ParseNodeSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (cluster, list) = match s.split_once(':') {
            Some((cluster, list)) => (cluster.trim(), Some(list)),
            None => (s.trim(), None),
        };
        if cluster.is_empty() {
            return Err(ParseNodeSetError::EmptyCluster);
        }

        let mut nodes = Vec::new();
        if let Some(list) = list {
            for entry in list.split(',').map(str::trim) {
                if entry.is_empty() {
                    return Err(ParseNodeSetError::EmptyNode);
                }
                match parse_range(entry)? {
                    Some((lo, hi)) => nodes.extend((lo..=hi).map(NodeId::from)),
                    None => nodes.push(NodeId::from(entry)),
                }
            }
        }

        Ok(Self {
            cluster: cluster.to_string(),
            nodes,
        })
    }
}

/// Parse `lo-hi` where both sides are numeric. Non-numeric entries such as
/// `client-a` are names, not ranges.
fn parse_range(entry: &str) -> Result<Option<(u32, u32)>, ParseNodeSetError> {
    let Some((lo, hi)) = entry.split_once('-') else {
        return Ok(None);
    };
    let (Ok(lo), Ok(hi)) = (lo.parse::<u32>(), hi.parse::<u32>()) else {
        return Ok(None);
    };
    if lo > hi {
        return Err(ParseNodeSetError::InvalidRange(entry.to_string()));
    }
    Ok(Some((lo, hi)))
}
