//! Cluster event sources.
//!
//! An [`EventSource`] turns a node set and a cancellation scope into a lazy,
//! possibly infinite stream of [`NodeEvent`]s. The stream must end soon after
//! the scope is cancelled.
//!
//! # Example
//!
//! ```ignore
//! let source = MockEventSource::new()
//!     .emit_after(Duration::from_millis(5), NodeEvent::dead("1", Some(137)));
//! let mut events = source.monitor(&nodes, cancel.clone()).await?;
//! while let Some(event) = events.next().await { ... }
//! ```

mod mock;

pub use mock::MockEventSource;

use crate::error::EventSourceError;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use mon_types::{NodeEvent, NodeSet};
use tokio_util::sync::CancellationToken;

/// Lazy stream of node events. An `Err` item ends the watch.
pub type EventStream = BoxStream<'static, Result<NodeEvent, EventSourceError>>;

/// Produces node events for a set of nodes.
///
/// Implementations handle the underlying mechanism
/// (Docker events API, process supervisor, mock, etc).
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Open an event stream for `nodes`, bound to `cancel`.
    ///
    /// Returns [`EventSourceError::Open`] if the stream cannot be started.
    async fn monitor(
        &self,
        nodes: &NodeSet,
        cancel: CancellationToken,
    ) -> Result<EventStream, EventSourceError>;
}
