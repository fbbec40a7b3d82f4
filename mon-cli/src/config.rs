//! Configuration for clustermon.
//!
//! Every section is optional. Command-line flags override file values.
//!
//! ```toml
//! [monitor]
//! expected_deaths = 1
//! log_events = true
//!
//! [docker]
//! label_prefix = "com.docker.compose"
//!
//! [[tasks]]
//! name = "workload"
//! command = "./workload.sh --duration 30s"
//! ```

use anyhow::{Context, Result};
use mon_chaos::DockerSourceConfig;
use mon_core::MonitorConfig;
use mon_types::NodeSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Monitor settings.
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Docker event source settings.
    #[serde(default)]
    pub docker: DockerSourceConfig,
    /// Commands registered as monitored tasks before any `--run`.
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

/// A shell command run as a monitored task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskConfig {
    /// Name used in logs (default: the command itself).
    #[serde(default)]
    pub name: Option<String>,
    /// Command line passed to `sh -c`.
    pub command: String,
}

impl TaskConfig {
    /// Task from a bare command line.
    pub fn from_command(command: impl Into<String>) -> Self {
        Self {
            name: None,
            command: command.into(),
        }
    }

    /// Name shown in logs.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.command)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}

/// Build the node set for `project`, optionally narrowed to `nodes`.
pub fn node_set(project: &str, nodes: Option<&str>) -> Result<NodeSet> {
    match nodes {
        None => project.parse::<NodeSet>(),
        Some(list) => format!("{project}:{list}").parse::<NodeSet>(),
    }
    .with_context(|| format!("invalid node selection for project {project}"))
}
