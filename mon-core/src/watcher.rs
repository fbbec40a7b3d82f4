//! Event watcher: reads node events until the first unexpected death.

use crate::error::MonitorError;
use crate::ledger::ExpectedDeaths;
use crate::source::EventSource;
use futures_util::StreamExt;
use mon_types::{NodeEvent, NodeSet};
use tokio_util::sync::CancellationToken;

/// How the watcher treats one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Not a death.
    Benign,
    /// A death the test declared in advance.
    Expected,
    /// A death with no tolerance left.
    Unexpected,
}

/// Classify `event`, consuming tolerance from `ledger` for deaths.
pub(crate) fn classify(event: &NodeEvent, ledger: &ExpectedDeaths) -> Verdict {
    if !event.is_death() {
        Verdict::Benign
    } else if ledger.consume() {
        Verdict::Expected
    } else {
        Verdict::Unexpected
    }
}

/// Watch `nodes` until the stream ends, `scope` is cancelled, or a node dies
/// unexpectedly.
///
/// Returns `Ok(())` on a clean end or cancellation.
pub(crate) async fn watch<S>(
    source: &S,
    nodes: &NodeSet,
    ledger: &ExpectedDeaths,
    scope: &CancellationToken,
    log_events: bool,
) -> Result<(), MonitorError>
where
    S: EventSource + ?Sized,
{
    let mut events = source
        .monitor(nodes, scope.clone())
        .await
        .map_err(MonitorError::EventSource)?;

    loop {
        let next = tokio::select! {
            biased;
            _ = scope.cancelled() => return Ok(()),
            next = events.next() => next,
        };

        let event = match next {
            None => return Ok(()),
            Some(Err(err)) => return Err(MonitorError::EventSource(err)),
            Some(Ok(event)) => event,
        };

        match classify(&event, ledger) {
            Verdict::Benign if log_events => tracing::info!("Monitor event: {}", event),
            Verdict::Benign => tracing::debug!("Monitor event: {}", event),
            Verdict::Expected => tracing::info!("Monitor event: {}: expected", event),
            Verdict::Unexpected => {
                tracing::error!("Monitor event: {}", event);
                return Err(MonitorError::UnexpectedDeath(event));
            }
        }
    }
}
