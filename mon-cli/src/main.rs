//! # clustermon
//!
//! Run commands against a Docker Compose cluster while watching its nodes.
//!
//! ## Commands
//!
//! - `watch`: Supervise shell commands and fail on an unexpected node death
//! - `events`: Print the node event stream
//!
//! ## Example
//!
//! ```bash
//! # Tolerate one death while a chaos script kills a node
//! clustermon watch --project demo --expect-deaths 1 \
//!     --run "./workload.sh" --run "./kill-node-2.sh"
//!
//! # Watch two services until Ctrl+C
//! clustermon events --project demo --nodes node-1,node-2 --json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use mon_core::CancellationToken;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{events, watch};
use config::Config;

/// Run commands against a cluster while watching node liveness.
#[derive(Parser, Debug)]
#[command(name = "clustermon")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Supervise commands and fail on an unexpected node death
    Watch {
        /// Docker Compose project to monitor
        #[arg(long, short)]
        project: String,

        /// Comma-separated services to watch (default: all)
        #[arg(long, short)]
        nodes: Option<String>,

        /// Node deaths to tolerate (overrides the config file)
        #[arg(long)]
        expect_deaths: Option<i32>,

        /// Shell command to run as a monitored task (repeatable)
        #[arg(long = "run", short = 'r', value_name = "CMD")]
        run: Vec<String>,
    },

    /// Print node events until Ctrl+C
    Events {
        /// Docker Compose project to watch
        #[arg(long, short)]
        project: String,

        /// Comma-separated services to watch (default: all)
        #[arg(long, short)]
        nodes: Option<String>,

        /// Print one JSON object per event
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let root = CancellationToken::new();
    let on_signal = root.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, shutting down");
            on_signal.cancel();
        }
    });

    match cli.command {
        Commands::Watch {
            project,
            nodes,
            expect_deaths,
            run,
        } => {
            let nodes = config::node_set(&project, nodes.as_deref())?;
            watch::run(config, nodes, expect_deaths, run, root).await?;
        }
        Commands::Events {
            project,
            nodes,
            json,
        } => {
            let nodes = config::node_set(&project, nodes.as_deref())?;
            events::run(&config, &nodes, json, root).await?;
        }
    }

    Ok(())
}

/// Install the global fmt subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
