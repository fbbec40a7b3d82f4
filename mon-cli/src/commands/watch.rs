//! Watch command - run shell commands as monitored tasks.
//!
//! Every command runs under `sh -c`. A non-zero exit fails the monitor; an
//! unexpected node death kills the remaining commands.

use anyhow::{Context, Result};
use mon_chaos::DockerEventSource;
use mon_core::{CancellationToken, Monitor, TestHandle, TestRun};
use mon_types::NodeSet;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{Config, TaskConfig};

/// Why a shell task failed.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The shell could not be started or waited on.
    #[error("{task}: {source}")]
    Io {
        /// Task label.
        task: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The command exited unsuccessfully.
    #[error("{task}: {status}")]
    Exit {
        /// Task label.
        task: String,
        /// Exit status of the shell.
        status: ExitStatus,
    },
}

/// Monitor `nodes` while the configured and `--run` commands execute.
pub async fn run(
    config: Config,
    nodes: NodeSet,
    expect_deaths: Option<i32>,
    commands: Vec<String>,
    root: CancellationToken,
) -> Result<()> {
    let Config {
        mut monitor,
        docker,
        mut tasks,
    } = config;
    if let Some(count) = expect_deaths {
        monitor.expected_deaths = count;
    }
    tasks.extend(commands.into_iter().map(TaskConfig::from_command));

    let source = DockerEventSource::connect(docker).context("Failed to connect to Docker")?;
    let test = Arc::new(TestRun::new(format!("watch {nodes}")));
    let monitor = Monitor::with_config(&root, Arc::clone(&test), source, nodes, monitor);

    for task in tasks {
        let status = Arc::clone(&test);
        monitor.register_task(move |cancel| async move {
            status.worker_status(&format!("running {}", task.label()));
            run_shell(&task, cancel).await
        });
    }

    monitor.wait_e().await?;
    Ok(())
}

/// Run `task` under `sh -c`. The child is killed if `cancel` fires first.
pub async fn run_shell(task: &TaskConfig, cancel: CancellationToken) -> Result<(), CommandError> {
    let io_error = |source| CommandError::Io {
        task: task.label().to_string(),
        source,
    };

    let mut child = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(&task.command)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(io_error)?;
    tracing::info!(task = task.label(), "task started");

    let status = tokio::select! {
        _ = cancel.cancelled() => {
            tracing::info!(task = task.label(), "task cancelled");
            return Ok(());
        }
        status = child.wait() => status.map_err(io_error)?,
    };

    if !status.success() {
        return Err(CommandError::Exit {
            task: task.label().to_string(),
            status,
        });
    }
    tracing::info!(task = task.label(), "task finished");
    Ok(())
}
