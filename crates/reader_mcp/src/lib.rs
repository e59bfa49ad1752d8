//! MCP (Model Context Protocol) server for the Readwise Reader list API
//!
//! Requests arrive as newline-delimited JSON-RPC 2.0 on stdin.
//!
//! CRITICAL: stdout is reserved EXCLUSIVELY for JSON-RPC responses.
//! All logs (Info/Warn/Error) MUST go to stderr to avoid protocol corruption.

pub mod server;
pub mod tools;

use reader_common::{ReaderError, Result};
use reader_config::{McpConfig, OutputFormat};
use reader_core::format;
use reader_core::{ListResponse, ReaderApi};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Protocol revisions this server can speak, newest last
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2024-11-05", "2025-03-26", "2025-06-18"];

/// JSON-RPC request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const UPSTREAM_ERROR: i32 = 1008;
    pub const NETWORK_ERROR: i32 = 1009;
    pub const INVALID_UPSTREAM_RESPONSE: i32 = 1010;

    /// Convert ReaderError to JSON-RPC error
    pub fn from_reader_error(err: &ReaderError) -> Self {
        let code = match err {
            ReaderError::ValidationError(_) => Self::INVALID_PARAMS,
            ReaderError::MethodNotFound(_) => Self::METHOD_NOT_FOUND,
            ReaderError::Upstream { .. } => Self::UPSTREAM_ERROR,
            ReaderError::NetworkError(_) => Self::NETWORK_ERROR,
            ReaderError::InvalidResponse(_) => Self::INVALID_UPSTREAM_RESPONSE,
            _ => Self::INTERNAL_ERROR,
        };

        let data = match err {
            ReaderError::Upstream { status, .. } => Some(json!({ "status": status })),
            _ => None,
        };

        Self {
            code,
            message: err.to_string(),
            data,
        }
    }

    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self {
            code: Self::PARSE_ERROR,
            message: format!("Parse error: {}", detail),
            data: None,
        }
    }
}

/// Request dispatcher shared by every in-flight request
pub struct McpServer {
    api: Arc<dyn ReaderApi>,
    output: OutputFormat,
    server_name: String,
}

impl McpServer {
    pub fn new(api: Arc<dyn ReaderApi>, config: &McpConfig) -> Self {
        Self {
            api,
            output: config.output,
            server_name: config.server_name.clone(),
        }
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }

    /// Handle one raw line from the transport; `None` means nothing to send back
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        tracing::debug!("Received: {}", line);

        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request).await?,
            Err(e) => {
                tracing::error!("Failed to parse request: {}", e);
                JsonRpcResponse::failure(None, JsonRpcError::parse_error(e))
            }
        };

        match serde_json::to_string(&response) {
            Ok(json) => {
                tracing::debug!("Sending: {}", json);
                Some(json)
            }
            Err(e) => {
                tracing::error!("Failed to serialize response: {}", e);
                None
            }
        }
    }

    /// Handle a single JSON-RPC request. Notifications get no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        // Log to stderr only
        tracing::info!(target: "mcp", method = %request.method, "Handling MCP request");

        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::failure(
                Some(id),
                JsonRpcError {
                    code: JsonRpcError::INVALID_REQUEST,
                    message: format!("Unsupported jsonrpc version: {}", request.jsonrpc),
                    data: None,
                },
            ));
        }

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(tools::tool_list()),
            "tools/call" => self.handle_tools_call(request.params).await,
            tools::LIST_DOCUMENTS => {
                self.call_list_documents(request.params.unwrap_or(Value::Null))
                    .await
            }
            other => Err(ReaderError::MethodNotFound(other.to_string())),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(Some(id), value),
            Err(e) => JsonRpcResponse::failure(Some(id), JsonRpcError::from_reader_error(&e)),
        })
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" => tracing::info!("Client initialized"),
            "notifications/cancelled" => {
                tracing::debug!("Cancellation ignored, requests run to completion")
            }
            other => tracing::debug!("Ignoring notification {}", other),
        }
    }

    fn handle_initialize(&self, params: Option<Value>) -> Result<Value> {
        let requested = params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);

        let version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().any(|s| s == v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

        Ok(json!({
            "protocolVersion": version,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": self.server_name,
                "version": env!("CARGO_PKG_VERSION")
            }
        }))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value> {
        #[derive(Deserialize)]
        struct ToolCallParams {
            name: String,
            #[serde(default)]
            arguments: Option<Value>,
        }

        let params: ToolCallParams = params
            .ok_or_else(|| ReaderError::ValidationError("Missing params".to_string()))
            .and_then(|v| {
                serde_json::from_value(v)
                    .map_err(|e| ReaderError::ValidationError(format!("Invalid params: {}", e)))
            })?;

        match params.name.as_str() {
            tools::LIST_DOCUMENTS => {
                self.call_list_documents(params.arguments.unwrap_or(Value::Null))
                    .await
            }
            other => Err(ReaderError::ValidationError(format!("Unknown tool: {}", other))),
        }
    }

    async fn call_list_documents(&self, arguments: Value) -> Result<Value> {
        let args = tools::ListDocumentsArgs::from_value(arguments)?;
        let outcome = tools::list_documents(self.api.as_ref(), args).await;
        self.render_tool_result(outcome)
    }

    /// Shape a tool outcome for the configured output format.
    ///
    /// JSON mode raises failures as JSON-RPC errors; text mode reports them
    /// inside the result with `isError` set.
    fn render_tool_result(&self, outcome: Result<ListResponse>) -> Result<Value> {
        match (self.output, outcome) {
            (OutputFormat::Json, Ok(list)) => {
                let structured = serde_json::to_value(&list)?;
                let text = serde_json::to_string_pretty(&structured)?;
                Ok(json!({
                    "content": [{ "type": "text", "text": text }],
                    "structuredContent": structured,
                    "isError": false
                }))
            }
            (OutputFormat::Json, Err(e)) => Err(e),
            (OutputFormat::Text, Ok(list)) => Ok(text_result(format::render_list(&list), false)),
            (OutputFormat::Text, Err(e)) => Ok(text_result(format::render_error(&e), true)),
        }
    }
}

fn text_result(text: String, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error
    })
}
