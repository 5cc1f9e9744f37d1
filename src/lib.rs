//! Visual Feedback Relay Library
//!
//! Relays annotated screenshots from a browser extension to a coding agent:
//! - In-memory feedback store with a pending/processing/done lifecycle
//! - Polling HTTP bridge for the extension, with port-conflict recovery
//! - MCP tool interface over stdio for the agent
//! - Debounced attention nudge so the agent notices new feedback
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use visual_feedback::store::FeedbackStore;
//! use visual_feedback::types::NewFeedback;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(FeedbackStore::new());
//!     let id = store.add(NewFeedback::default()).await;
//!     println!("queued {}", id);
//! }
//! ```

// Core modules
pub mod types;
pub mod store;
pub mod notifier;
pub mod config;
pub mod bridge;
pub mod mcp;
pub mod cli;

// Re-export commonly used types for convenience
pub use config::Config;
pub use notifier::{Notifier, NudgeConfig};
pub use store::{ClaimOutcome, FeedbackStore};
pub use types::{FeedbackItem, FeedbackStatus, NewFeedback};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
