//! MCP stdio transport
//!
//! Serves the consumer-facing tool interface as an MCP server speaking
//! JSON-RPC 2.0 over newline-delimited stdin/stdout. All logging goes to
//! stderr; stdout belongs to the protocol.

pub mod tools;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::store::FeedbackStore;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC request envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC response envelope
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcResponse {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// The MCP server for the feedback tools
pub struct McpServer {
    store: Arc<FeedbackStore>,
}

impl McpServer {
    pub fn new(store: Arc<FeedbackStore>) -> Self {
        Self { store }
    }

    /// Serve until the client closes stdin
    pub async fn run_stdio(&self) -> Result<()> {
        let mut reader = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader
                .read_line(&mut line)
                .await
                .context("Failed to read from stdin")?;
            if bytes_read == 0 {
                // EOF, client disconnected
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let Some(response) = self.handle_line(trimmed).await else {
                continue;
            };
            let encoded =
                serde_json::to_string(&response).context("Failed to encode MCP response")?;
            stdout
                .write_all(encoded.as_bytes())
                .await
                .context("Failed to write to stdout")?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        Ok(())
    }

    /// Handle one raw line; notifications produce no response
    async fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        let request: RpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                return Some(RpcResponse::err(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        };

        let Some(id) = request.id else {
            debug!("Notification: {}", request.method);
            return None;
        };

        Some(
            self.handle_request(id, &request.method, request.params)
                .await,
        )
    }

    async fn handle_request(&self, id: Value, method: &str, params: Value) -> RpcResponse {
        match method {
            "initialize" => RpcResponse::ok(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": crate::NAME,
                        "version": crate::VERSION,
                    }
                }),
            ),
            "ping" => RpcResponse::ok(id, json!({})),
            "tools/list" => RpcResponse::ok(id, json!({ "tools": tools::definitions() })),
            "tools/call" => match self.call_tool(params).await {
                Ok(result) => RpcResponse::ok(id, result),
                Err(e) => RpcResponse::err(id, INVALID_PARAMS, e.to_string()),
            },
            _ => RpcResponse::err(id, METHOD_NOT_FOUND, format!("Method not found: {}", method)),
        }
    }

    async fn call_tool(&self, params: Value) -> Result<Value> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .context("Missing tool name")?;
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
        tools::dispatch(&self.store, name, arguments).await
    }
}
