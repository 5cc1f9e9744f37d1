//! CLI interface for the visual feedback relay

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::bridge::{self, BridgeState, PORT_SCAN_WINDOW};
use crate::config::{self, Config};
use crate::mcp::McpServer;
use crate::notifier::Notifier;
use crate::store::FeedbackStore;

#[derive(Parser)]
#[command(name = "visual-feedback")]
#[command(about = "Relay annotated screenshots from the browser to a coding agent", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay: MCP server on stdio plus the HTTP bridge (default)
    Serve {
        /// Port for the HTTP bridge
        #[arg(short, long, env = "VF_PORT")]
        port: Option<u16>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Disable the attention-signal nudge
        #[arg(long)]
        no_nudge: bool,
    },
    /// Probe a running relay and print its queue state
    Status {
        /// Base port to scan from
        #[arg(short, long, env = "VF_PORT")]
        port: Option<u16>,
    },
    /// Configure the relay
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set the HTTP bridge port
        #[arg(long)]
        set_port: Option<u16>,
        /// Set the nudge command
        #[arg(long)]
        set_nudge_command: Option<String>,
        /// Enable the nudge
        #[arg(long)]
        enable_nudge: bool,
        /// Disable the nudge
        #[arg(long)]
        disable_nudge: bool,
        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

/// Parse arguments and run the selected command
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => serve(None, None, false).await,
        Some(Commands::Serve {
            port,
            host,
            no_nudge,
        }) => serve(port, host, no_nudge).await,
        Some(Commands::Status { port }) => status(port).await,
        Some(Commands::Config {
            show,
            set_port,
            set_nudge_command,
            enable_nudge,
            disable_nudge,
            reset,
        }) => {
            let mutated = reset
                || set_port.is_some()
                || set_nudge_command.is_some()
                || enable_nudge
                || disable_nudge;

            if reset {
                config::reset_config()?;
            }
            if let Some(port) = set_port {
                config::set_port(port)?;
            }
            if let Some(command) = set_nudge_command {
                config::set_nudge_command(&command)?;
            }
            if enable_nudge {
                config::set_nudge_enabled(true)?;
            }
            if disable_nudge {
                config::set_nudge_enabled(false)?;
            }

            if show || !mutated {
                config::show_config()?;
            }
            Ok(())
        }
    }
}

/// Wire up one store, both transports, and the notifier, then serve stdio
async fn serve(port: Option<u16>, host: Option<String>, no_nudge: bool) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(port) = port {
        config.bridge.port = port;
    }
    if let Some(host) = host {
        config.bridge.host = host;
    }
    if no_nudge {
        config.nudge.enabled = false;
    }

    // One store instance, injected into both transports
    let store = Arc::new(FeedbackStore::new());
    let notifier = Arc::new(Notifier::new(config.nudge.clone()));
    let state = BridgeState {
        store: store.clone(),
        notifier,
        project_name: config::project_name(),
    };

    bridge::start(&config.bridge, state).await?;

    info!(
        "Visual feedback relay running (stdio + HTTP, nudge: {})",
        if config.nudge.enabled { "on" } else { "off" }
    );
    McpServer::new(store).run_stdio().await
}

/// Scan the port window for a live relay, the same way the extension does
async fn status(port: Option<u16>) -> Result<()> {
    let config = Config::load()?;
    let base = port.unwrap_or(config.bridge.port);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(800))
        .build()
        .context("Failed to build HTTP client")?;

    for port in base..base.saturating_add(PORT_SCAN_WINDOW) {
        let url = format!("http://{}:{}/health", config.bridge.host, port);
        let Ok(response) = client.get(&url).send().await else {
            continue;
        };
        if !response.status().is_success() {
            continue;
        }

        let health: serde_json::Value = response
            .json()
            .await
            .context("Health response was not JSON")?;
        println!("Relay found on port {}", port);
        println!(
            "  project: {}",
            health
                .get("projectName")
                .and_then(|v| v.as_str())
                .unwrap_or("?")
        );
        println!(
            "  pending: {}",
            health.get("queueSize").and_then(|v| v.as_u64()).unwrap_or(0)
        );
        return Ok(());
    }

    println!(
        "No relay found on ports {}-{}",
        base,
        base.saturating_add(PORT_SCAN_WINDOW - 1)
    );
    Ok(())
}
