//! Visual Feedback - screenshot feedback relay
//!
//! Bridges an annotation browser extension to a coding agent over MCP.

// Use the library crate for all modules
use visual_feedback::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP transport, so all logging goes to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Run CLI
    cli::run().await
}
