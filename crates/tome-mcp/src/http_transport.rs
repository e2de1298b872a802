//! HTTP transport for the MCP server.
//!
//! A single JSON-RPC endpoint (`POST /mcp`) behind the bearer-token
//! middleware, plus two unauthenticated routes: a human-readable info page
//! at `GET /` and a liveness check at `GET /health`. The health route makes
//! no dependency checks; it answers "ok" whenever the process is alive.

use crate::auth;
use crate::error::McpError;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::server::McpServer;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use std::sync::Arc;
use tome_core::TokenStore;
use tower_http::trace::TraceLayer;

const INFO_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Tome &mdash; MCP Server</title>
  <style>
    body { font-family: monospace; max-width: 720px; margin: 60px auto;
           padding: 20px; line-height: 1.6; }
    code { background: #eee; padding: 2px 6px; border-radius: 4px; }
    pre  { background: #eee; padding: 16px; border-radius: 6px; overflow-x: auto; }
  </style>
</head>
<body>
  <h1>Tome &mdash; MCP Server</h1>

  <p>This is an <strong>MCP (Model Context Protocol)</strong> server providing
  semantic search over a documentation knowledge base.
  Access requires a Bearer token.</p>

  <h2>MCP Endpoint</h2>
  <pre>POST /mcp
Authorization: Bearer &lt;your-token&gt;
Content-Type: application/json</pre>

  <h2>Available Tools</h2>
  <ul>
    <li><code>search_knowledge(query, n_results=5)</code> &mdash; semantic search over the knowledge base</li>
    <li><code>list_collections()</code> &mdash; list available collections</li>
    <li><code>get_page(page_num)</code> &mdash; fetch the raw content of a page by its number</li>
  </ul>

  <h2>Health Check</h2>
  <pre>GET /health</pre>
</body>
</html>
"#;

/// Build the router: public info/health routes and the protected RPC
/// endpoint, with auth and request tracing layered on top.
pub fn create_router(server: Arc<McpServer>, tokens: Arc<TokenStore>) -> Router {
    Router::new()
        .route("/", get(handle_info))
        .route("/health", get(handle_health))
        .route("/mcp", post(handle_mcp_post))
        .layer(middleware::from_fn_with_state(tokens, auth::require_bearer))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

async fn handle_info() -> Html<&'static str> {
    Html(INFO_HTML)
}

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "tome-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn handle_mcp_post(
    State(server): State<Arc<McpServer>>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    Json(server.handle_request(request).await)
}

/// HTTP server for the MCP transport.
pub struct HttpServer {
    host: String,
    port: u16,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        server: Arc<McpServer>,
        tokens: Arc<TokenStore>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            router: create_router(server, tokens),
        }
    }

    /// Run until ctrl-c.
    pub async fn run(self) -> Result<(), McpError> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| McpError::StartupFailed(format!("failed to bind to {addr}: {e}")))?;

        tracing::info!(%addr, "MCP HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::PageDirectory;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tome_index::{IndexAdapter, IndexError, RawMatch, VectorIndex};
    use tower::ServiceExt;

    struct EmptyEngine;

    impl VectorIndex for EmptyEngine {
        fn count(&self) -> Result<usize, IndexError> {
            Ok(0)
        }

        fn query(&self, _text: &str, _limit: usize) -> Result<Vec<RawMatch>, IndexError> {
            Ok(Vec::new())
        }

        fn collections(&self) -> Result<Vec<String>, IndexError> {
            Ok(Vec::new())
        }
    }

    fn test_router(tokens: Arc<TokenStore>) -> Router {
        let adapter = IndexAdapter::new(Arc::new(EmptyEngine), 1).unwrap();
        let pages = PageDirectory::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let server = Arc::new(McpServer::new(adapter, pages));
        create_router(server, tokens)
    }

    fn empty_store() -> (tempfile::TempDir, Arc<TokenStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TokenStore::new(dir.path().join("tokens.json")));
        (dir, store)
    }

    #[tokio::test]
    async fn test_health_endpoint_needs_no_auth() {
        let (_dir, tokens) = empty_store();
        let response = test_router(tokens)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_info_page_needs_no_auth() {
        let (_dir, tokens) = empty_store();
        let response = test_router(tokens)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_mcp_without_token_is_unauthorized() {
        let (_dir, tokens) = empty_store();
        let response = test_router(tokens)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mcp")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
