//! Consumer-facing feedback tools
//!
//! The four operations the coding agent invokes over the MCP transport.
//! Empty-queue and nothing-in-flight conditions are normal tool results,
//! never protocol errors.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use crate::store::{ClaimOutcome, FeedbackStore};

/// Instruction preview length in list output
const PREVIEW_LEN: usize = 80;

/// Fallback when the producer sent only annotations
const DEFAULT_INSTRUCTIONS: &str = "Fix the circled issues in this screenshot.";

/// Tool definitions for `tools/list`
pub fn definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "get_visual_feedback",
            "description": "Get the next visual feedback item. Returns an annotated screenshot \
                with circled issues and optional text instructions. Call this when the user says \
                to fix visual issues or check feedback.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
        json!({
            "name": "respond_visual_feedback",
            "description": "Report the result for the feedback item currently being processed. \
                The browser extension shows this text to the user.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "What was done about the feedback"
                    }
                },
                "required": ["message"]
            }
        }),
        json!({
            "name": "list_visual_feedback",
            "description": "List all queued visual feedback items without consuming them. \
                Returns summaries only, no screenshots.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
        json!({
            "name": "clear_visual_feedback",
            "description": "Clear all visual feedback items from the queue.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
    ]
}

/// Route a `tools/call` to its implementation
pub async fn dispatch(store: &FeedbackStore, name: &str, arguments: Value) -> Result<Value> {
    match name {
        "get_visual_feedback" => Ok(get_feedback(store).await),
        "respond_visual_feedback" => respond_feedback(store, arguments).await,
        "list_visual_feedback" => Ok(list_feedback(store).await),
        "clear_visual_feedback" => Ok(clear_feedback(store).await),
        _ => bail!("Unknown tool: {}", name),
    }
}

fn text_result(text: impl Into<String>) -> Value {
    json!({ "content": [{ "type": "text", "text": text.into() }] })
}

/// Claim the earliest pending item and hand it to the agent
async fn get_feedback(store: &FeedbackStore) -> Value {
    match store.claim_next_pending().await {
        ClaimOutcome::Empty => text_result("No visual feedback items in the queue."),
        ClaimOutcome::Busy { in_flight } => text_result(format!(
            "Feedback item {} is still being processed. Call respond_visual_feedback \
             with the result before fetching the next one.",
            in_flight
        )),
        ClaimOutcome::Claimed(item) => {
            let instructions = if item.instructions.is_empty() {
                DEFAULT_INSTRUCTIONS
            } else {
                &item.instructions
            };
            let remaining = store.pending_count().await;
            let header = [
                format!("**Page:** {} ({})", item.page_title, item.page_url),
                format!("**Instructions:** {}", instructions),
                format!("**Remaining in queue:** {}", remaining),
            ]
            .join("\n");

            let mut content = vec![json!({ "type": "text", "text": header })];
            if !item.image.is_empty() {
                content.push(json!({
                    "type": "image",
                    "data": item.image,
                    "mimeType": "image/png"
                }));
            }
            json!({ "content": content })
        }
    }
}

/// Complete the in-flight item with the agent's result text
async fn respond_feedback(store: &FeedbackStore, arguments: Value) -> Result<Value> {
    let message = arguments
        .get("message")
        .and_then(Value::as_str)
        .context("Missing required argument: message")?;

    Ok(match store.respond(message).await {
        Some(item) => text_result(format!(
            "Recorded response for feedback {}. The extension will pick it up on its next poll.",
            item.id
        )),
        None => text_result(
            "No feedback item is awaiting a response. Fetch one with get_visual_feedback first.",
        ),
    })
}

/// Summarize the queue without consuming or shipping screenshots
async fn list_feedback(store: &FeedbackStore) -> Value {
    let items = store.list_all().await;
    if items.is_empty() {
        return text_result("No visual feedback items in the queue.");
    }

    let summary = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let instructions = if item.instructions.is_empty() {
                "(no text, just annotations)".to_string()
            } else {
                preview(&item.instructions)
            };
            format!(
                "{}. [{}] {} — {}",
                i + 1,
                item.status,
                item.page_title,
                instructions
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    text_result(format!(
        "**Visual Feedback Queue ({})**\n\n{}",
        items.len(),
        summary
    ))
}

async fn clear_feedback(store: &FeedbackStore) -> Value {
    let count = store.clear().await;
    text_result(format!("Cleared {} feedback items.", count))
}

/// Char-safe truncation for instruction previews
fn preview(instructions: &str) -> String {
    if instructions.chars().count() > PREVIEW_LEN {
        let cut: String = instructions.chars().take(PREVIEW_LEN).collect();
        format!("{}...", cut)
    } else {
        instructions.to_string()
    }
}
