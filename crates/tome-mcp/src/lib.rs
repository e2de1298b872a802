//! # tome-mcp
//!
//! MCP (Model Context Protocol) server for the Tome knowledge base.
//!
//! The server exposes three tools over JSON-RPC on a single HTTP endpoint,
//! gated by bearer-token authentication:
//!
//! - `search_knowledge(query, n_results)` — semantic search via the index
//! - `list_collections()` — collection names from the index
//! - `get_page(page_num)` — raw page content fetched from the upstream site
//!
//! ## Architecture
//!
//! ```text
//! MCP client (AI agent)
//!       │
//!       │ POST /mcp  (Authorization: Bearer <token>)
//!       ▼
//! ┌──────────────────┐
//! │ auth middleware  │  ← token store file, re-read per request
//! ├──────────────────┤
//! │ dispatcher       │  ← typed argument validation
//! ├────────┬─────────┤
//! │ index  │ pages   │  ← worker-pool search / single-flight manifest
//! └────────┴─────────┘
//! ```
//!
//! `GET /` and `GET /health` stay public; everything else is denied without
//! a valid token.

pub mod auth;
pub mod error;
pub mod http_transport;
pub mod pages;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::McpError;
pub use http_transport::HttpServer;
pub use pages::PageDirectory;
pub use protocol::{CallToolParams, JsonRpcRequest, JsonRpcResponse, ToolDefinition};
pub use server::McpServer;
pub use tools::ToolRegistry;
