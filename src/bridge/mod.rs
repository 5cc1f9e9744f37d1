//! Producer-facing HTTP bridge
//!
//! Exposes the feedback store to the browser extension over plain
//! request/response polling. The bridge also owns port acquisition: when the
//! configured port is taken it scans forward through a bounded window (the
//! same window the extension scans) and binds the first free port. If the
//! whole window is exhausted the bridge is disabled and the process keeps
//! running on the stdio tool transport alone.

pub mod http;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::notifier::Notifier;
use crate::store::FeedbackStore;

/// Ports scanned past the configured one. Must match the extension's scan
/// range or a fallback bind would be undiscoverable.
pub const PORT_SCAN_WINDOW: u16 = 20;

/// Submission bodies above this are rejected without creating an item
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Port to bind (first candidate of the scan window)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    9823
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Shared bridge state, injected into every handler
#[derive(Clone)]
pub struct BridgeState {
    pub store: Arc<FeedbackStore>,
    pub notifier: Arc<Notifier>,
    pub project_name: String,
}

/// Build the bridge router
pub fn router(state: BridgeState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(http::health_handler))
        .route("/feedback", post(http::submit_handler))
        .route("/feedback/{id}", get(http::status_handler))
        .fallback(http::not_handled)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the first free port in the scan window
async fn bind_available(host: &str, base_port: u16) -> Option<(TcpListener, u16)> {
    for port in base_port..base_port.saturating_add(PORT_SCAN_WINDOW) {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => return Some((listener, port)),
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                debug!("Port {} in use, trying next", port);
            }
            Err(e) => {
                warn!("Failed to bind {}:{}: {}", host, port, e);
            }
        }
    }
    None
}

/// Start the bridge in the background.
///
/// Returns Ok even when every port in the window is taken; HTTP is then
/// disabled and the caller's stdio transport carries on alone.
pub async fn start(config: &BridgeConfig, state: BridgeState) -> Result<()> {
    let Some((listener, port)) = bind_available(&config.host, config.port).await else {
        warn!(
            "Ports {}-{} all in use; HTTP bridge disabled, stdio tools still work",
            config.port,
            config.port.saturating_add(PORT_SCAN_WINDOW - 1)
        );
        return Ok(());
    };

    if port != config.port {
        info!("Port {} was taken, bound {} instead", config.port, port);
    }
    info!(
        "Feedback bridge listening on http://{}:{}",
        config.host, port
    );

    let app = router(state);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!("HTTP bridge stopped: {}", e);
        }
    });

    Ok(())
}
