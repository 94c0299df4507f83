//! Line-delimited JSON-RPC 2.0 front end over the tool registry.
//!
//! Supported methods: `tools/list` and `tools/call`. Tool failures are
//! successful responses flagged with `isError`, so the caller sees the
//! human-readable reason; protocol problems are JSON-RPC errors.

use serde_json::{Value, json};

use crate::tools::ToolRegistry;

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

fn error_response(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message.into() }
    })
}

fn result_response(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn text_result(text: &str, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error
    })
}

/// Handle one request line; returns the response line.
pub async fn handle_line(registry: &ToolRegistry, line: &str) -> String {
    let response = match serde_json::from_str::<Value>(line) {
        Ok(request) => handle_request(registry, request).await,
        Err(e) => error_response(Value::Null, PARSE_ERROR, format!("Parse error: {e}")),
    };
    response.to_string()
}

/// Handle one parsed request.
pub async fn handle_request(registry: &ToolRegistry, request: Value) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let Some(method) = request.get("method").and_then(|m| m.as_str()) else {
        return error_response(id, INVALID_REQUEST, "Request has no method");
    };

    match method {
        "tools/list" => {
            let tools = registry.tool_definitions().await;
            result_response(id, json!({ "tools": tools }))
        }
        "tools/call" => {
            let params = request.get("params").cloned().unwrap_or(Value::Null);
            let Some(name) = params.get("name").and_then(|n| n.as_str()) else {
                return error_response(id, INVALID_PARAMS, "tools/call needs params.name");
            };
            let Some(tool) = registry.get(name).await else {
                return error_response(id, INVALID_PARAMS, format!("Unknown tool: {name}"));
            };
            let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

            tracing::info!(tool = name, "Tool call");
            match tool.execute(arguments).await {
                Ok(output) => {
                    tracing::debug!(tool = name, elapsed_ms = output.duration.as_millis() as u64, "Tool done");
                    result_response(id, text_result(&output.content, false))
                }
                Err(e) => {
                    tracing::warn!(tool = name, error = %e, "Tool failed");
                    result_response(id, text_result(&e.to_string(), true))
                }
            }
        }
        other => error_response(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
    }
}
