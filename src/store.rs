//! In-memory feedback store
//!
//! Single owner of every [`FeedbackItem`] for the lifetime of the process.
//! Both transports share one instance behind an `Arc`; each operation holds
//! the store mutex for its full scan-then-mutate span, so claims and
//! responses stay atomic on a multi-threaded runtime. Callers only ever get
//! cloned snapshots back.
//!
//! Absence ("queue empty", "nothing processing", "unknown id") is always a
//! normal return value, never an error.

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::types::{FeedbackItem, FeedbackStatus, NewFeedback};

/// Result of attempting to claim the next pending item
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    /// The earliest pending item, now marked processing
    Claimed(FeedbackItem),
    /// Another item is still processing; nothing was claimed
    Busy { in_flight: Uuid },
    /// No pending items
    Empty,
}

/// The feedback queue shared by the HTTP bridge and the tool interface
#[derive(Default)]
pub struct FeedbackStore {
    items: Mutex<Vec<FeedbackItem>>,
}

impl FeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new pending item and return its id. Always succeeds.
    pub async fn add(&self, fields: NewFeedback) -> Uuid {
        let item = FeedbackItem {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            page_url: fields.page_url,
            page_title: fields.page_title,
            image: fields.image,
            instructions: fields.instructions,
            status: FeedbackStatus::Pending,
            response: None,
        };
        let id = item.id;
        self.items.lock().await.push(item);
        id
    }

    /// Read-only lookup by id
    pub async fn get_by_id(&self, id: Uuid) -> Option<FeedbackItem> {
        self.items.lock().await.iter().find(|i| i.id == id).cloned()
    }

    /// Claim the earliest pending item, flipping it to processing.
    ///
    /// At most one item may be processing at a time; while one is in flight
    /// the claim is rejected with [`ClaimOutcome::Busy`] rather than handing
    /// out a second item. No two callers can ever claim the same item: the
    /// scan and the status flip happen under one lock acquisition.
    pub async fn claim_next_pending(&self) -> ClaimOutcome {
        let mut items = self.items.lock().await;

        if let Some(busy) = items
            .iter()
            .find(|i| i.status == FeedbackStatus::Processing)
        {
            return ClaimOutcome::Busy { in_flight: busy.id };
        }

        match items
            .iter_mut()
            .find(|i| i.status == FeedbackStatus::Pending)
        {
            Some(item) => {
                item.status = FeedbackStatus::Processing;
                ClaimOutcome::Claimed(item.clone())
            }
            None => ClaimOutcome::Empty,
        }
    }

    /// Attach the agent's response to the item currently processing,
    /// flipping it to done. Returns `None` and leaves the store unchanged
    /// when nothing is processing.
    pub async fn respond(&self, message: &str) -> Option<FeedbackItem> {
        let mut items = self.items.lock().await;
        let item = items
            .iter_mut()
            .find(|i| i.status == FeedbackStatus::Processing)?;
        item.response = Some(message.to_string());
        item.status = FeedbackStatus::Done;
        Some(item.clone())
    }

    /// Number of items still waiting to be claimed
    pub async fn pending_count(&self) -> usize {
        self.items
            .lock()
            .await
            .iter()
            .filter(|i| i.status == FeedbackStatus::Pending)
            .count()
    }

    /// Total number of items regardless of status
    pub async fn total_count(&self) -> usize {
        self.items.lock().await.len()
    }

    /// Snapshot of every item in insertion order
    pub async fn list_all(&self) -> Vec<FeedbackItem> {
        self.items.lock().await.clone()
    }

    /// Remove every item regardless of status; returns the prior count
    pub async fn clear(&self) -> usize {
        let mut items = self.items.lock().await;
        let count = items.len();
        items.clear();
        count
    }
}
