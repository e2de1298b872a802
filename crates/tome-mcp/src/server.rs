//! MCP server implementation.
//!
//! This module provides the main MCP server that handles tool discovery and
//! execution. The server owns all long-lived state — the tool registry, the
//! index adapter and the page directory — and is shared behind an `Arc`, so
//! concurrent calls only touch immutable state and the explicitly guarded
//! caches. Every failure is converted to a structured JSON-RPC error here;
//! nothing escapes the dispatch boundary.

use crate::error::McpError;
use crate::pages::PageDirectory;
use crate::protocol::{CallToolParams, JsonRpcRequest, JsonRpcResponse};
use crate::tools::ToolRegistry;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tome_index::IndexAdapter;

/// The MCP server.
pub struct McpServer {
    tools: ToolRegistry,
    index: IndexAdapter,
    pages: PageDirectory,
}

#[derive(Debug, Deserialize)]
struct SearchKnowledgeArgs {
    query: String,
    #[serde(default = "default_n_results")]
    n_results: i64,
}

fn default_n_results() -> i64 {
    5
}

#[derive(Debug, Deserialize)]
struct GetPageArgs {
    page_num: u32,
}

impl McpServer {
    /// Create a server over the given index adapter and page directory.
    pub fn new(index: IndexAdapter, pages: PageDirectory) -> Self {
        Self {
            tools: ToolRegistry::with_builtin_tools(),
            index,
            pages,
        }
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" => JsonRpcResponse::success(id, json!({})),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": {
                "name": "tome-mcp",
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = self.tools.list();
        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {e}"))
                }
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params"),
        };

        if !self.tools.contains(&params.name) {
            let err = McpError::ToolNotFound { name: params.name };
            return JsonRpcResponse::error(id, err.rpc_code(), err.to_string());
        }

        match self.dispatch(&params.name, params.arguments).await {
            Ok(value) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [{"type": "json", "json": value}],
                    "isError": false
                }),
            ),
            Err(err) => {
                tracing::debug!(tool = %params.name, error = %err, "tool call failed");
                JsonRpcResponse::error(id, err.rpc_code(), err.to_string())
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<Value, McpError> {
        match name {
            "search_knowledge" => {
                let args: SearchKnowledgeArgs = parse_args(name, arguments)?;
                let results = self.index.search(&args.query, args.n_results).await?;
                serde_json::to_value(results)
                    .map_err(|e| McpError::Search(format!("failed to encode results: {e}")))
            }
            "list_collections" => {
                let names = self.index.list_collections().await?;
                Ok(json!(names))
            }
            "get_page" => {
                let args: GetPageArgs = parse_args(name, arguments)?;
                let body = self.pages.get_page(args.page_num).await?;
                Ok(Value::String(body))
            }
            _ => Err(McpError::ToolNotFound {
                name: name.to_string(),
            }),
        }
    }
}

/// Deserialize tool arguments, naming the tool and offending field on error.
/// Absent arguments are treated as the empty object so that optional-only
/// tools accept a bare call.
fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, McpError> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::PageDirectory;
    use std::sync::Arc;
    use std::time::Duration;
    use tome_index::{IndexAdapter, IndexError, RawMatch, VectorIndex};

    struct FakeEngine {
        docs: usize,
    }

    impl VectorIndex for FakeEngine {
        fn count(&self) -> Result<usize, IndexError> {
            Ok(self.docs)
        }

        fn query(&self, _text: &str, limit: usize) -> Result<Vec<RawMatch>, IndexError> {
            Ok((0..limit)
                .map(|i| RawMatch {
                    id: format!("{i}-doc"),
                    content: format!("document {i}"),
                    metadata: None,
                    distance: i as f64 / 10.0,
                })
                .collect())
        }

        fn collections(&self) -> Result<Vec<String>, IndexError> {
            Ok(vec!["knowledge_base".to_string()])
        }
    }

    fn server_with_docs(docs: usize) -> McpServer {
        let adapter = IndexAdapter::new(Arc::new(FakeEngine { docs }), 2).unwrap();
        // Port 1 refuses connections; only get_page tests ever dial it.
        let pages = PageDirectory::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        McpServer::new(adapter, pages)
    }

    fn request(method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = server_with_docs(0);
        let response = server.handle_request(request("initialize", None)).await;
        assert!(response.result.is_some());
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_list_tools() {
        let server = server_with_docs(0);
        let response = server.handle_request(request("tools/list", None)).await;
        let tools = response.result.unwrap()["tools"].as_array().unwrap().len();
        assert_eq!(tools, 3);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = server_with_docs(0);
        let response = server.handle_request(request("resources/list", None)).await;
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_call_nonexistent_tool() {
        let server = server_with_docs(0);
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({"name": "nonexistent", "arguments": {}})),
            ))
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("nonexistent"));
    }

    #[tokio::test]
    async fn test_search_missing_query_names_the_field() {
        let server = server_with_docs(3);
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({"name": "search_knowledge", "arguments": {"n_results": 2}})),
            ))
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("query"));
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_argument_type() {
        let server = server_with_docs(3);
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({
                    "name": "search_knowledge",
                    "arguments": {"query": "dos", "n_results": "five"}
                })),
            ))
            .await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_search_defaults_and_clamps_n_results() {
        let server = server_with_docs(3);
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({
                    "name": "search_knowledge",
                    "arguments": {"query": "interrupt table", "n_results": 50}
                })),
            ))
            .await;
        let result = response.result.unwrap();
        let matches = result["content"][0]["json"].as_array().unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(result["isError"], json!(false));
        // metadata normalized to an object even when the engine had none
        assert!(matches[0]["metadata"].is_object());
    }

    #[tokio::test]
    async fn test_search_empty_index_returns_empty_array() {
        let server = server_with_docs(0);
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({"name": "search_knowledge", "arguments": {"query": "anything"}})),
            ))
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["json"], json!([]));
    }

    #[tokio::test]
    async fn test_list_collections_tool() {
        let server = server_with_docs(1);
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({"name": "list_collections", "arguments": {}})),
            ))
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["json"], json!(["knowledge_base"]));
    }

    #[tokio::test]
    async fn test_get_page_rejects_negative_page_number() {
        let server = server_with_docs(0);
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({"name": "get_page", "arguments": {"page_num": -3}})),
            ))
            .await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_get_page_unreachable_upstream_is_upstream_error() {
        let server = server_with_docs(0);
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({"name": "get_page", "arguments": {"page_num": 42}})),
            ))
            .await;
        assert_eq!(response.error.unwrap().code, -32002);
    }
}
