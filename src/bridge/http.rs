//! HTTP handlers for the feedback bridge

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::BridgeState;
use crate::types::{FeedbackStatus, NewFeedback};

/// Structured bridge errors; each maps to one JSON error response
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Payload too large (max 10MB)")]
    PayloadTooLarge,
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("Not found")]
    NotFound,
    #[error("Not handled")]
    NotHandled,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InvalidJson => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::NotHandled => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "ok": false, "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}

/// Health response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub queue_size: usize,
    pub project_name: String,
}

/// Submit response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub ok: bool,
    pub id: Uuid,
    pub queue_size: usize,
}

/// Status-lookup response; `response` is an explicit null until done
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ok: bool,
    pub id: Uuid,
    pub status: FeedbackStatus,
    pub response: Option<String>,
}

/// `GET /health` - always succeeds
pub async fn health_handler(State(state): State<BridgeState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        queue_size: state.store.pending_count().await,
        project_name: state.project_name.clone(),
    })
}

/// `POST /feedback` - accept a submission from the extension
pub async fn submit_handler(
    State(state): State<BridgeState>,
    payload: Result<Json<NewFeedback>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(fields) = payload.map_err(|rejection| match rejection {
        // The body-limit layer cut the read off mid-stream
        JsonRejection::BytesRejection(_) => ApiError::PayloadTooLarge,
        _ => ApiError::InvalidJson,
    })?;

    let id = state.store.add(fields).await;
    let queue_size = state.store.pending_count().await;

    let id_str = id.to_string();
    info!("Received feedback {} (pending: {})", &id_str[..8], queue_size);

    // The item is already stored; the nudge is best-effort from here on
    state.notifier.arm().await;

    Ok(Json(SubmitResponse {
        ok: true,
        id,
        queue_size,
    }))
}

/// `GET /feedback/{id}` - poll an item's status and response
pub async fn status_handler(
    State(state): State<BridgeState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound)?;
    let item = state.store.get_by_id(id).await.ok_or(ApiError::NotFound)?;

    Ok(Json(StatusResponse {
        ok: true,
        id: item.id,
        status: item.status,
        response: item.response,
    }))
}

/// Fallback for every unrecognized route or method
pub async fn not_handled() -> ApiError {
    ApiError::NotHandled
}
