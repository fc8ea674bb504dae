//! Server - newline-delimited JSON-RPC front-end over stdio
//!
//! One request per line, one response per line. Tool failures come back as
//! error-tagged results inside a successful JSON-RPC response; only
//! protocol-level problems (parse errors, unknown methods) produce JSON-RPC
//! error objects. The process never exits because of a tool failure.

use advisor_tools::ToolRegistry;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

fn error_response(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": {"code": code, "message": message.into()}
    })
}

/// Stdio JSON-RPC server over a tool registry
pub struct RpcServer {
    registry: ToolRegistry,
}

impl RpcServer {
    /// Create a server over a populated registry
    #[must_use]
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// The underlying registry
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one request line. Notifications produce no response.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let request: RpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Failed to parse request line");
                return Some(error_response(
                    Value::Null,
                    -32700,
                    format!("Parse error: {e}"),
                ));
            }
        };

        let Some(id) = request.id else {
            debug!(method = %request.method, "Notification received");
            return None;
        };

        Some(self.handle_request(id, &request.method, request.params).await)
    }

    async fn handle_request(&self, id: Value, method: &str, params: Value) -> Value {
        match method {
            "tools/list" => json!({
                "jsonrpc": JSONRPC_VERSION,
                "id": id,
                "result": {"tools": self.registry.list()}
            }),
            "tools/call" => {
                let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
                    return error_response(id, -32602, "Missing tool name in params");
                };
                let arguments = params
                    .get("arguments")
                    .cloned()
                    .unwrap_or_else(|| json!({}));

                let result = self.registry.call(name, arguments).await;
                json!({
                    "jsonrpc": JSONRPC_VERSION,
                    "id": id,
                    "result": result
                })
            }
            other => error_response(id, -32601, format!("Method not found: {other}")),
        }
    }

    /// Serve requests from stdin until it closes
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        info!(tools = self.registry.len(), "Serving tools over stdio");

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(line).await {
                let mut payload = serde_json::to_vec(&response)?;
                payload.push(b'\n');
                stdout.write_all(&payload).await?;
                stdout.flush().await?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_llm::{CompletionClient, CompletionParams};
    use advisor_tools::register_builtins;
    use std::sync::Arc;

    struct EchoClient;

    #[async_trait::async_trait]
    impl CompletionClient for EchoClient {
        async fn complete(&self, params: CompletionParams) -> advisor_llm::Result<String> {
            Ok(params.messages[0].content.clone())
        }
    }

    fn test_server() -> RpcServer {
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry, Arc::new(EchoClient));
        RpcServer::new(registry)
    }

    #[tokio::test]
    async fn test_tools_list() {
        let server = test_server();
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
            .await
            .unwrap();

        assert_eq!(response["id"], 1);
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 8);
        assert!(tools
            .iter()
            .any(|t| t["name"] == "analyze_repository_and_cloud"));
    }

    #[tokio::test]
    async fn test_tools_call_round_trip() {
        let server = test_server();
        let response = server
            .handle_line(
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"claude_completion","arguments":{"prompt":"ping"}}}"#,
            )
            .await
            .unwrap();

        assert_eq!(response["id"], 2);
        assert_eq!(response["result"]["isError"], false);
        assert_eq!(response["result"]["content"][0]["text"], "ping");
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool_is_tool_error_not_rpc_error() {
        let server = test_server();
        let response = server
            .handle_line(
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"does_not_exist","arguments":{}}}"#,
            )
            .await
            .unwrap();

        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["isError"], true);
        assert_eq!(
            response["result"]["content"][0]["text"],
            "Unknown tool: does_not_exist"
        );
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = test_server();
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#)
            .await
            .unwrap();

        assert_eq!(response["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_parse_error() {
        let server = test_server();
        let response = server.handle_line("{not json").await.unwrap();
        assert_eq!(response["error"]["code"], -32700);
        assert_eq!(response["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let server = test_server();
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_missing_tool_name() {
        let server = test_server();
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{}}"#)
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], -32602);
    }
}
