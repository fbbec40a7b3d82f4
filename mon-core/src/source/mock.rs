//! Mock event source for testing.
//!
//! Replays a scripted sequence of events and failures, each after a delay.

use super::{EventSource, EventStream};
use crate::error::EventSourceError;
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use mon_types::{NodeEvent, NodeSet};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
enum Step {
    Event(NodeEvent),
    Fail(String),
}

/// Mock event source for testing.
///
/// Delays are relative to the previous step. After the script runs out the
/// stream closes, unless [`hold_open`](Self::hold_open) keeps it pending
/// until the scope is cancelled.
#[derive(Debug, Default)]
pub struct MockEventSource {
    inner: Arc<Mutex<MockEventSourceInner>>,
}

#[derive(Debug, Default)]
struct MockEventSourceInner {
    script: Vec<(Duration, Step)>,
    hold_open: bool,
    fail_next_open: Option<String>,
    opened: Vec<NodeSet>,
    delivered: usize,
}

impl MockEventSource {
    /// Create a mock source with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `event` immediately after the previous step.
    pub fn emit(self, event: NodeEvent) -> Self {
        self.emit_after(Duration::ZERO, event)
    }

    /// Emit `event` once `delay` has passed since the previous step.
    pub fn emit_after(self, delay: Duration, event: NodeEvent) -> Self {
        self.push(delay, Step::Event(event));
        self
    }

    /// Fail the stream once `delay` has passed since the previous step.
    pub fn fail_after(self, delay: Duration, message: &str) -> Self {
        self.push(delay, Step::Fail(message.to_string()));
        self
    }

    /// Keep the stream open after the script until the scope is cancelled.
    pub fn hold_open(self) -> Self {
        self.inner.lock().unwrap().hold_open = true;
        self
    }

    /// Cause the next `monitor()` call to fail with the given error.
    pub fn fail_next_open(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_open = Some(error.to_string());
    }

    /// Node sets passed to `monitor()`, in call order.
    pub fn opened(&self) -> Vec<NodeSet> {
        self.inner.lock().unwrap().opened.clone()
    }

    /// Number of events handed to a consumer so far.
    pub fn delivered(&self) -> usize {
        self.inner.lock().unwrap().delivered
    }

    fn push(&self, delay: Duration, step: Step) {
        self.inner.lock().unwrap().script.push((delay, step));
    }
}

impl Clone for MockEventSource {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn monitor(
        &self,
        nodes: &NodeSet,
        cancel: CancellationToken,
    ) -> Result<EventStream, EventSourceError> {
        let (steps, hold_open) = {
            let mut inner = self.inner.lock().unwrap();
            inner.opened.push(nodes.clone());

            // Check for forced failure
            if let Some(error) = inner.fail_next_open.take() {
                return Err(EventSourceError::open(error));
            }

            (
                inner.script.iter().cloned().collect::<VecDeque<_>>(),
                inner.hold_open,
            )
        };

        let shared = Arc::clone(&self.inner);
        let events = stream::unfold(steps, move |mut steps| {
            let cancel = cancel.clone();
            let shared = Arc::clone(&shared);
            async move {
                let Some((delay, step)) = steps.pop_front() else {
                    if hold_open {
                        cancel.cancelled().await;
                    }
                    return None;
                };

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    _ = tokio::time::sleep(delay) => {
                        let item = match step {
                            Step::Event(event) => {
                                shared.lock().unwrap().delivered += 1;
                                Ok(event)
                            }
                            Step::Fail(message) => Err(EventSourceError::stream(message)),
                        };
                        Some((item, steps))
                    }
                }
            }
        });

        Ok(events.boxed())
    }
}
