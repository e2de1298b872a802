//! Bearer-token credential store.
//!
//! Tokens live in a flat JSON file mapping the opaque token string to its
//! metadata. The server only ever reads the file; writes happen through the
//! CLI (`tome token add|revoke`), possibly while a server is running. Reads
//! are therefore re-done per auth check rather than cached, and a missing or
//! corrupt file is treated as an empty store so the server fails closed
//! instead of crashing.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Metadata stored per token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEntry {
    /// Who or what the token was issued for.
    #[serde(default)]
    pub description: String,
}

/// Generate a new opaque token: 32 random bytes, URL-safe base64.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Handle on the token file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a store handle for the given file path. The file need not
    /// exist yet; it is created on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current token map. Missing or unparseable files yield an
    /// empty map.
    pub fn load(&self) -> BTreeMap<String, TokenEntry> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => parse_tolerant(&contents),
            Err(_) => BTreeMap::new(),
        }
    }

    /// Async variant of [`load`](Self::load) for the request path.
    pub async fn snapshot(&self) -> BTreeMap<String, TokenEntry> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => parse_tolerant(&contents),
            Err(_) => BTreeMap::new(),
        }
    }

    /// Check whether a token is currently valid.
    pub async fn is_valid(&self, token: &str) -> bool {
        !token.is_empty() && self.snapshot().await.contains_key(token)
    }

    /// Issue a new token with the given description and persist it.
    /// Returns the token string; it is shown once and never logged.
    pub fn add(&self, description: impl Into<String>) -> std::io::Result<String> {
        let mut tokens = self.load();
        let token = generate_token();
        tokens.insert(
            token.clone(),
            TokenEntry {
                description: description.into(),
            },
        );
        self.save(&tokens)?;
        Ok(token)
    }

    /// Remove a token. Returns its entry if it existed.
    pub fn revoke(&self, token: &str) -> std::io::Result<Option<TokenEntry>> {
        let mut tokens = self.load();
        let removed = tokens.remove(token);
        if removed.is_some() {
            self.save(&tokens)?;
        }
        Ok(removed)
    }

    fn save(&self, tokens: &BTreeMap<String, TokenEntry>) -> std::io::Result<()> {
        let mut contents = serde_json::to_string_pretty(tokens)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        contents.push('\n');
        std::fs::write(&self.path, contents)
    }
}

fn parse_tolerant(contents: &str) -> BTreeMap<String, TokenEntry> {
    match serde_json::from_str(contents) {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::warn!(error = %e, "token file unparseable, treating store as empty");
            BTreeMap::new()
        }
    }
}
