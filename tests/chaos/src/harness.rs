//! Cluster harness: a Docker Compose project as a test cluster.
//!
//! Manages the lifecycle of a Compose topology under a unique project name
//! and provides methods for injecting node failures, executing commands
//! inside containers, and collecting logs. The harness hands out a
//! [`DockerEventSource`] and the project [`NodeSet`] for a monitor.

use bollard::container::{KillContainerOptions, LogsOptions, RestartContainerOptions};
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::Docker;
use futures_util::StreamExt;
use mon_types::{NodeId, NodeSet};
use std::path::PathBuf;
use thiserror::Error;

use crate::source::{DockerEventSource, DockerSourceConfig};

/// Errors that can occur during cluster harness operations.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Docker API error.
    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    /// Command execution failed inside container.
    #[error("exec failed in {container}: exit={exit_code}, stderr={stderr}")]
    ExecFailed {
        /// Container name.
        container: String,
        /// Exit code from command.
        exit_code: i64,
        /// Standard error output.
        stderr: String,
    },

    /// Docker Compose CLI error.
    #[error("compose error: {0}")]
    Compose(String),

    /// General I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of executing a command inside a container.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Exit code (0 = success).
    pub exit_code: i64,
}

impl ExecResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A Docker Compose project used as a test cluster.
///
/// Each node is a Compose service. Provides methods for:
/// - Starting/stopping the topology
/// - Node failures (kill, restart, pause/unpause)
/// - Executing commands inside node containers
/// - Collecting node logs
/// - Building a monitor event source for the project
pub struct ClusterHarness {
    /// Unique project name for Docker Compose isolation.
    project_name: String,
    /// Path to the compose file.
    compose_file: PathBuf,
    /// bollard Docker client.
    docker: Docker,
}

impl ClusterHarness {
    /// Create a new harness with a unique project name.
    ///
    /// The compose_file path should be absolute or relative to cwd.
    pub fn new(compose_file: PathBuf) -> Result<Self, HarnessError> {
        let docker = Docker::connect_with_local_defaults()?;
        let project_name = format!("clustermon-{}", uuid::Uuid::new_v4().as_simple());

        Ok(Self {
            project_name,
            compose_file,
            docker,
        })
    }

    /// Get the unique project name.
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Node set covering every service in the project.
    pub fn node_set(&self) -> NodeSet {
        NodeSet::all(self.project_name.clone())
    }

    /// Node set covering only `services`.
    pub fn nodes<I, N>(&self, services: I) -> NodeSet
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        NodeSet::new(self.project_name.clone(), services)
    }

    /// Event source reading this project's container events.
    pub fn event_source(&self) -> DockerEventSource {
        self.event_source_with(DockerSourceConfig::default())
    }

    /// Event source with explicit configuration.
    pub fn event_source_with(&self, config: DockerSourceConfig) -> DockerEventSource {
        DockerEventSource::with_config(self.docker.clone(), config)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start the Docker Compose topology.
    ///
    /// Runs `docker compose up -d --wait` with the unique project name.
    pub async fn setup(&self) -> Result<(), HarnessError> {
        self.compose(&["up", "-d", "--wait"]).await?;
        tracing::info!(project = %self.project_name, "cluster up");
        Ok(())
    }

    /// Tear down the Docker Compose topology, removing containers and volumes.
    pub async fn teardown(&self) -> Result<(), HarnessError> {
        self.compose(&["down", "-v", "--remove-orphans", "-t", "1"])
            .await?;
        tracing::info!(project = %self.project_name, "cluster down");
        Ok(())
    }

    async fn compose(&self, args: &[&str]) -> Result<(), HarnessError> {
        let compose_file = self.compose_file.to_string_lossy();
        let output = tokio::process::Command::new("docker")
            .args(["compose", "-f", &*compose_file, "-p", self.project_name.as_str()])
            .args(args)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HarnessError::Compose(format!(
                "docker compose {} failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr
            )));
        }

        Ok(())
    }

    // ========================================================================
    // Container exec
    // ========================================================================

    /// Execute a command inside a node container and return the result.
    pub async fn exec_in_node(&self, node: &str, cmd: Vec<&str>) -> Result<ExecResult, HarnessError> {
        let container_name = self.container_name(node);

        let exec_options = CreateExecOptions {
            cmd: Some(cmd.iter().map(|s| s.to_string()).collect()),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let exec = self
            .docker
            .create_exec(&container_name, exec_options)
            .await?;

        let mut stdout = String::new();
        let mut stderr = String::new();

        if let StartExecResults::Attached { mut output, .. } =
            self.docker.start_exec(&exec.id, None).await?
        {
            while let Some(Ok(msg)) = output.next().await {
                match msg {
                    bollard::container::LogOutput::StdOut { message } => {
                        stdout.push_str(&String::from_utf8_lossy(&message));
                    }
                    bollard::container::LogOutput::StdErr { message } => {
                        stderr.push_str(&String::from_utf8_lossy(&message));
                    }
                    _ => {}
                }
            }
        }

        let inspect = self.docker.inspect_exec(&exec.id).await?;
        let exit_code = inspect.exit_code.unwrap_or(-1);

        Ok(ExecResult {
            stdout,
            stderr,
            exit_code,
        })
    }

    /// Execute a command inside a node container, returning error on non-zero exit.
    pub async fn exec_ok(&self, node: &str, cmd: Vec<&str>) -> Result<ExecResult, HarnessError> {
        let result = self.exec_in_node(node, cmd).await?;
        if !result.success() {
            return Err(HarnessError::ExecFailed {
                container: self.container_name(node),
                exit_code: result.exit_code,
                stderr: result.stderr.clone(),
            });
        }
        Ok(result)
    }

    // ========================================================================
    // Node failures
    // ========================================================================

    /// Kill a node with SIGKILL.
    pub async fn kill_node(&self, node: &str) -> Result<(), HarnessError> {
        self.signal_node(node, "SIGKILL").await
    }

    /// Send `signal` to a node's main process.
    pub async fn signal_node(&self, node: &str, signal: &str) -> Result<(), HarnessError> {
        let name = self.container_name(node);
        tracing::info!(node, signal, "signalling node");
        self.docker
            .kill_container(&name, Some(KillContainerOptions { signal }))
            .await?;
        Ok(())
    }

    /// Restart a node. Produces a death followed by a start.
    pub async fn restart_node(&self, node: &str) -> Result<(), HarnessError> {
        let name = self.container_name(node);
        tracing::info!(node, "restarting node");
        self.docker
            .restart_container(&name, Some(RestartContainerOptions { t: 1 }))
            .await?;
        Ok(())
    }

    /// Pause a node (freeze all processes).
    pub async fn pause_node(&self, node: &str) -> Result<(), HarnessError> {
        let name = self.container_name(node);
        self.docker.pause_container(&name).await?;
        Ok(())
    }

    /// Unpause a paused node.
    pub async fn unpause_node(&self, node: &str) -> Result<(), HarnessError> {
        let name = self.container_name(node);
        self.docker.unpause_container(&name).await?;
        Ok(())
    }

    // ========================================================================
    // Log collection
    // ========================================================================

    /// Everything a node has written to stdout and stderr, across restarts.
    pub async fn node_logs(&self, node: &str) -> Result<String, HarnessError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            ..Default::default()
        };

        let mut chunks = self.docker.logs(&self.container_name(node), Some(options));
        let mut logs = String::new();
        while let Some(chunk) = chunks.next().await {
            logs.push_str(&chunk?.to_string());
        }
        Ok(logs)
    }

    /// Build the full container name from project name and service.
    ///
    /// Docker Compose naming: `<project>-<service>-1`
    pub fn container_name(&self, node: &str) -> String {
        format!("{}-{}-1", self.project_name, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harness_unique_project_names() {
        let h1 = ClusterHarness::new(PathBuf::from("test.yml")).unwrap();
        let h2 = ClusterHarness::new(PathBuf::from("test.yml")).unwrap();

        assert_ne!(h1.project_name(), h2.project_name());
        assert!(h1.project_name().starts_with("clustermon-"));
    }

    #[test]
    fn container_name_format() {
        let h = ClusterHarness::new(PathBuf::from("test.yml")).unwrap();
        assert_eq!(
            h.container_name("node-2"),
            format!("{}-node-2-1", h.project_name())
        );
    }

    #[test]
    fn node_sets_use_project_as_cluster() {
        let h = ClusterHarness::new(PathBuf::from("test.yml")).unwrap();

        let all = h.node_set();
        assert!(all.is_all());
        assert_eq!(all.cluster(), h.project_name());

        let some = h.nodes(["node-1", "node-3"]);
        assert!(some.contains(&NodeId::new("node-3")));
        assert!(!some.contains(&NodeId::new("node-2")));
    }
}
