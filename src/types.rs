//! Shared types used across modules
//!
//! The wire format is camelCase because the browser extension speaks it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    /// Submitted, waiting for the agent to pick it up
    Pending,
    /// Claimed by the agent, response not yet attached
    Processing,
    /// Response attached; the extension reads it on its next poll
    Done,
}

impl std::fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackStatus::Pending => write!(f, "pending"),
            FeedbackStatus::Processing => write!(f, "processing"),
            FeedbackStatus::Done => write!(f, "done"),
        }
    }
}

/// One unit of relayed work: an annotated screenshot plus instructions,
/// and eventually the agent's textual response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub page_url: String,
    pub page_title: String,
    /// Base64-encoded screenshot. Opaque to the relay; never decoded.
    pub image: String,
    pub instructions: String,
    pub status: FeedbackStatus,
    /// Set exactly once, at the processing -> done transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// Fields supplied by the producer when submitting feedback.
///
/// Doubles as the submit request body; every field may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewFeedback {
    pub page_url: String,
    pub page_title: String,
    pub image: String,
    pub instructions: String,
}
