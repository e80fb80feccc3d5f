//! Newline-delimited JSON-RPC 2.0 tool server speaking the MCP subset agents need.
//!
//! Requests are handled one at a time in arrival order. Stdout carries only protocol frames;
//! diagnostics go through `tracing`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::tools::ImageTools;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "image-gen-mcp";
const INSTRUCTIONS: &str =
    "Generate images using laozhang.ai Gemini 3 Pro API and save to Obsidian vault";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    method: String,
    #[serde(default)]
    params: JsonValue,
    /// Absent for notifications.
    #[serde(default)]
    id: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: JsonValue,
}

impl JsonRpcResponse {
    fn result(id: JsonValue, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: JsonValue, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    fn into_value(self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|e| {
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": { "code": -32603, "message": e.to_string() }
            })
        })
    }
}

pub struct McpServer {
    tools: ImageTools,
}

impl McpServer {
    pub fn new(tools: ImageTools) -> Self {
        Self { tools }
    }

    /// Handle one raw frame. `None` means nothing is written back.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let message = match serde_json::from_str::<JsonValue>(line) {
            Ok(v) => v,
            Err(e) => {
                warn!(target: "image_gen::server", error = %e, "unparsable frame");
                return Some(
                    JsonRpcResponse::error(JsonValue::Null, PARSE_ERROR, format!("Parse error: {e}"))
                        .into_value()
                        .to_string(),
                );
            }
        };
        self.handle_message(message).await.map(|v| v.to_string())
    }

    /// Handle one decoded JSON-RPC message.
    pub async fn handle_message(&self, message: JsonValue) -> Option<JsonValue> {
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(r) => r,
            Err(e) => {
                return Some(
                    JsonRpcResponse::error(
                        JsonValue::Null,
                        INVALID_REQUEST,
                        format!("Invalid request: {e}"),
                    )
                    .into_value(),
                )
            }
        };

        let Some(id) = request.id else {
            debug!(target: "image_gen::server", method = %request.method, "notification");
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::result(id, self.initialize(&request.params)),
            "ping" => JsonRpcResponse::result(id, json!({})),
            "tools/list" => JsonRpcResponse::result(id, Self::list_tools()),
            "tools/call" => self.call_tool(id, request.params).await,
            other => {
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))
            }
        };
        Some(response.into_value())
    }

    fn initialize(&self, params: &JsonValue) -> JsonValue {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(|v| v.as_str())
            .unwrap_or(PROTOCOL_VERSION);
        info!(target: "image_gen::server", %protocol_version, "client initialized");
        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
            "instructions": INSTRUCTIONS,
        })
    }

    fn list_tools() -> JsonValue {
        let tools: Vec<JsonValue> = ImageTools::descriptors()
            .into_iter()
            .map(|d| {
                json!({
                    "name": d.name,
                    "description": d.description,
                    "inputSchema": d.input_schema,
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, id: JsonValue, params: JsonValue) -> JsonRpcResponse {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}"))
            }
        };
        debug!(target: "image_gen::server", tool = %params.name, "tools/call");
        match self.tools.call(&params.name, params.arguments).await {
            Ok(output) => JsonRpcResponse::result(
                id,
                json!({
                    "content": [{ "type": "text", "text": output.text }],
                    "isError": output.is_error,
                }),
            ),
            Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
        }
    }

    /// Serve frames from `reader` until EOF, then release the model's network resources.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(reply) = self.handle_line(trimmed).await {
                writer.write_all(reply.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        info!(target: "image_gen::server", "input closed, shutting down");
        self.tools.model().close().await;
        Ok(())
    }

    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

#[cfg(test)]
#[path = "../tests/server_tests.rs"]
mod server_tests;
