//! Events command - print the node event stream.

use anyhow::{Context, Result};
use futures_util::StreamExt;
use mon_chaos::DockerEventSource;
use mon_core::{CancellationToken, EventSource};
use mon_types::{NodeEvent, NodeSet};

use crate::config::Config;

/// Print events for `nodes` until the stream ends or `cancel` fires.
pub async fn run(config: &Config, nodes: &NodeSet, json: bool, cancel: CancellationToken) -> Result<()> {
    let source =
        DockerEventSource::connect(config.docker.clone()).context("Failed to connect to Docker")?;
    let mut events = source.monitor(nodes, cancel).await?;

    println!("Watching {nodes}. Press Ctrl+C to stop.");
    while let Some(event) = events.next().await {
        println!("{}", render(&event?, json)?);
    }

    Ok(())
}

/// Format one event as a line of output.
fn render(event: &NodeEvent, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string(event)?)
    } else {
        Ok(event.to_string())
    }
}
