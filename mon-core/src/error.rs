//! Error types for clustermon.

use mon_types::NodeEvent;
use std::any::Any;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error returned by tasks and event sources.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Sentinel raised when the owning test is aborted.
///
/// [`abort`] unwinds with this value as the panic payload. The task
/// supervisor recognizes it and turns it back into an ordinary
/// [`TaskError::Aborted`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("test aborted: {message}")]
pub struct FatalAbort {
    /// The fatal message passed to the test handle.
    pub message: String,
}

impl FatalAbort {
    /// Create a sentinel carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Abort the current test by unwinding with a [`FatalAbort`] payload.
///
/// Uses `resume_unwind` so the panic hook does not print a second report.
/// Inside a monitor task the unwind is caught by the task wrapper.
pub fn abort(message: impl Into<String>) -> ! {
    std::panic::resume_unwind(Box::new(FatalAbort::new(message)))
}

/// Why a monitored task failed.
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    /// The task returned an error.
    #[error("{0}")]
    Failed(#[source] Arc<dyn StdError + Send + Sync>),

    /// The task aborted the test.
    #[error("{0}")]
    Aborted(#[source] FatalAbort),

    /// The task panicked with an error value.
    #[error("recovered panic: {0}")]
    PanicError(#[source] Arc<dyn StdError + Send + Sync>),

    /// The task panicked with a non-error payload.
    #[error("recovered panic: {message}")]
    Panicked {
        /// Rendered panic payload.
        message: String,
    },
}

impl TaskError {
    /// Wrap an error returned by a task.
    pub fn failed(err: impl Into<BoxError>) -> Self {
        TaskError::Failed(Arc::from(err.into()))
    }

    /// Convert a caught panic payload.
    ///
    /// A [`FatalAbort`] becomes [`TaskError::Aborted`], a boxed error is kept
    /// as-is, and string payloads are rendered into the message.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<FatalAbort>() {
            Ok(sentinel) => return TaskError::Aborted(*sentinel),
            Err(other) => other,
        };
        let payload = match payload.downcast::<BoxError>() {
            Ok(err) => return TaskError::PanicError(Arc::from(*err)),
            Err(other) => other,
        };

        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskError::Panicked { message }
    }

    /// Returns true if the task aborted the test.
    pub fn is_abort(&self) -> bool {
        matches!(self, TaskError::Aborted(_))
    }
}

/// Errors from a cluster event source.
#[derive(Debug, Clone, Error)]
pub enum EventSourceError {
    /// The event stream could not be opened.
    #[error("failed to open event stream: {0}")]
    Open(#[source] Arc<dyn StdError + Send + Sync>),

    /// The event stream failed after it was opened.
    #[error("event stream failed: {0}")]
    Stream(#[source] Arc<dyn StdError + Send + Sync>),
}

impl EventSourceError {
    /// Build an [`EventSourceError::Open`].
    pub fn open(err: impl Into<BoxError>) -> Self {
        EventSourceError::Open(Arc::from(err.into()))
    }

    /// Build an [`EventSourceError::Stream`].
    pub fn stream(err: impl Into<BoxError>) -> Self {
        EventSourceError::Stream(Arc::from(err.into()))
    }
}

/// The verdict of a failed monitor.
#[derive(Debug, Clone, Error)]
pub enum MonitorError {
    /// The owning test had already failed before `wait` was called.
    #[error("already failed")]
    AlreadyFailed,

    /// A registered task failed.
    #[error("monitor failure: monitor task failed: {0}")]
    Task(#[source] TaskError),

    /// A node died with no tolerance left.
    #[error("monitor failure: unexpected node event: {0}")]
    UnexpectedDeath(NodeEvent),

    /// The cluster event source failed.
    #[error("monitor failure: monitor command failure: {0}")]
    EventSource(#[source] EventSourceError),
}
