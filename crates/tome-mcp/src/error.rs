//! Error types for the MCP crate.

use thiserror::Error;
use tome_index::IndexError;

/// Errors that can occur while serving MCP requests.
///
/// Each variant maps to a stable JSON-RPC error code via
/// [`rpc_code`](McpError::rpc_code); messages never contain token material.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Tool not found.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// Invalid arguments for a tool.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// A page number with no manifest entry.
    #[error("page {0} not found")]
    PageNotFound(u32),

    /// Manifest or page fetch failed (non-success status, timeout, transport).
    #[error("upstream fetch failed: {0}")]
    Upstream(String),

    /// The vector index raised during count or query.
    #[error("search failed: {0}")]
    Search(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// Stable JSON-RPC error code for this error.
    pub fn rpc_code(&self) -> i32 {
        match self {
            McpError::ToolNotFound { .. } | McpError::InvalidArguments { .. } => -32602,
            McpError::PageNotFound(_) => -32001,
            McpError::Upstream(_) => -32002,
            McpError::Search(_) => -32003,
            McpError::StartupFailed(_) | McpError::Io(_) => -32603,
        }
    }
}

impl From<IndexError> for McpError {
    fn from(e: IndexError) -> Self {
        McpError::Search(e.to_string())
    }
}
