//! Configuration for the Tome server.
//!
//! Loaded from a YAML file (`tome.yaml` by default). Every section is
//! optional and falls back to defaults, so a minimal deployment only needs
//! to set `knowledge_base.base_url`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },

    /// The file is not valid YAML or has the wrong shape.
    #[error("failed to parse config file {path}: {source}")]
    ParseFailed {
        path: String,
        source: serde_yaml::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomeConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Bearer-token store settings.
    #[serde(default)]
    pub tokens: TokensConfig,

    /// Upstream knowledge-base site (manifest and raw pages).
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    /// Vector index settings.
    #[serde(default)]
    pub index: IndexConfig,
}

impl TomeConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::ParseFailed {
            path: path.display().to_string(),
            source,
        })
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Token store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokensConfig {
    /// Path to the JSON token file.
    #[serde(default = "default_tokens_file")]
    pub file: PathBuf,
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            file: default_tokens_file(),
        }
    }
}

/// Upstream knowledge-base site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Base URL of the site serving `pages.json` and `pages/<id>`.
    #[serde(default)]
    pub base_url: String,

    /// Timeout applied to every outbound fetch, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding one snapshot file per collection.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Collection that `search_knowledge` queries.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Worker threads for blocking engine calls. The engine is only safe
    /// for a handful of concurrent callers, so keep this small.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
            collection: default_collection(),
            workers: default_workers(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_tokens_file() -> PathBuf {
    PathBuf::from("tokens.json")
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("snapshots")
}

fn default_collection() -> String {
    "knowledge_base".to_string()
}

fn default_workers() -> usize {
    2
}
