//! End-to-end lifecycle tests across both transports
//!
//! The producer side talks to the HTTP bridge router, the consumer side goes
//! through the MCP tool dispatch, and both share one injected store.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use visual_feedback::bridge::{router, BridgeState};
use visual_feedback::mcp::tools;
use visual_feedback::{FeedbackStore, Notifier, NudgeConfig};

fn test_state() -> BridgeState {
    BridgeState {
        store: Arc::new(FeedbackStore::new()),
        notifier: Arc::new(Notifier::new(NudgeConfig {
            enabled: false,
            ..NudgeConfig::default()
        })),
        project_name: "lifecycle-demo".to_string(),
    }
}

fn submit_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/feedback")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn poll_status(app: &axum::Router, id: &str) -> Value {
    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/feedback/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await
}

#[tokio::test]
async fn submit_fetch_respond_poll_roundtrip() {
    let state = test_state();
    let store = state.store.clone();
    let app = router(state);

    // Producer submits annotated feedback
    let response = app
        .clone()
        .oneshot(submit_request(json!({
            "pageUrl": "http://a",
            "pageTitle": "A",
            "instructions": "fix button"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["queueSize"], 1);
    let id = body["id"].as_str().unwrap().to_string();

    // Producer polls: pending, no response yet
    let status = poll_status(&app, &id).await;
    assert_eq!(status["status"], "pending");
    assert!(status["response"].is_null());

    // Consumer claims the item over the tool interface
    let result = tools::dispatch(&store, "get_visual_feedback", json!({}))
        .await
        .unwrap();
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("fix button"));

    let status = poll_status(&app, &id).await;
    assert_eq!(status["status"], "processing");
    assert!(status["response"].is_null());

    // Consumer responds; producer's next poll sees the result
    tools::dispatch(
        &store,
        "respond_visual_feedback",
        json!({ "message": "fixed button color" }),
    )
    .await
    .unwrap();

    let status = poll_status(&app, &id).await;
    assert_eq!(status["status"], "done");
    assert_eq!(status["response"], "fixed button color");
}

#[tokio::test]
async fn two_submissions_are_claimed_in_order_under_the_busy_policy() {
    let state = test_state();
    let store = state.store.clone();
    let app = router(state);

    for instructions in ["first", "second"] {
        let response = app
            .clone()
            .oneshot(submit_request(json!({ "instructions": instructions })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(store.pending_count().await, 2);

    // First claim gets the first submission
    let result = tools::dispatch(&store, "get_visual_feedback", json!({}))
        .await
        .unwrap();
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("first"));

    // Second claim before responding is rejected, second item stays pending
    let result = tools::dispatch(&store, "get_visual_feedback", json!({}))
        .await
        .unwrap();
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("still being processed"));
    assert_eq!(store.pending_count().await, 1);

    // After responding, the second submission is claimable
    tools::dispatch(
        &store,
        "respond_visual_feedback",
        json!({ "message": "done with first" }),
    )
    .await
    .unwrap();

    let result = tools::dispatch(&store, "get_visual_feedback", json!({}))
        .await
        .unwrap();
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("second"));
}

#[tokio::test]
async fn clear_wipes_every_status_and_health_reflects_it() {
    let state = test_state();
    let store = state.store.clone();
    let app = router(state);

    for i in 0..3 {
        app.clone()
            .oneshot(submit_request(json!({ "instructions": format!("item {}", i) })))
            .await
            .unwrap();
    }
    tools::dispatch(&store, "get_visual_feedback", json!({}))
        .await
        .unwrap();
    tools::dispatch(
        &store,
        "respond_visual_feedback",
        json!({ "message": "done" }),
    )
    .await
    .unwrap();

    // pending + done items both go away
    let result = tools::dispatch(&store, "clear_visual_feedback", json!({}))
        .await
        .unwrap();
    assert_eq!(
        result["content"][0]["text"].as_str().unwrap(),
        "Cleared 3 feedback items."
    );

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let health = response_json(response).await;
    assert_eq!(health["queueSize"], 0);
    assert_eq!(health["projectName"], "lifecycle-demo");
}

#[tokio::test]
async fn rejected_submissions_never_reach_the_store() {
    let state = test_state();
    let store = state.store.clone();
    let app = router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/feedback")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("not json at all"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.total_count().await, 0);

    // The failed submission must not have left partial state behind
    let items = store.list_all().await;
    assert!(items.is_empty());
    assert!(!matches!(
        store.claim_next_pending().await,
        visual_feedback::ClaimOutcome::Claimed(_)
    ));
}
