//! # tome-core
//!
//! Shared building blocks for the Tome knowledge-base MCP server:
//!
//! - Configuration types for the server binary (`config`)
//! - The bearer-token credential store (`tokens`)
//!
//! Both are consumed by `tome-mcp` (read side) and `tome-cli` (read/write
//! side); nothing here starts a server or touches the network.

pub mod config;
pub mod tokens;

pub use config::{
    ConfigError, IndexConfig, KnowledgeBaseConfig, ServerConfig, TokensConfig, TomeConfig,
};
pub use tokens::{generate_token, TokenEntry, TokenStore};
