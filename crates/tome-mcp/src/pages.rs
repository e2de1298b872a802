//! Page directory: page number → upstream resource.
//!
//! The upstream site publishes a manifest (`pages.json`) listing resource
//! ids whose numeric prefix is the page number, e.g. `42-interrupts.html`
//! is page 42. The directory fetches that manifest at most once per process
//! lifetime and then serves lookups from the in-memory snapshot; there is no
//! refresh, so a catalog changed upstream goes stale until restart.

use crate::error::McpError;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;

/// One manifest entry. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: String,
}

/// Lazily-built page-number → resource-id directory plus the fetch client.
pub struct PageDirectory {
    client: reqwest::Client,
    base_url: String,
    pages: OnceCell<HashMap<u32, String>>,
}

impl PageDirectory {
    /// Create a directory for the given upstream base URL. The timeout
    /// applies to every outbound request; redirects are followed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, McpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| McpError::StartupFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pages: OnceCell::new(),
        })
    }

    /// Fetch the raw content of a page by number.
    ///
    /// Distinguishes a page absent from the manifest
    /// ([`McpError::PageNotFound`]) from a failing upstream
    /// ([`McpError::Upstream`]). A failed manifest load is not latched: the
    /// cell stays empty and the next call retries the fetch.
    pub async fn get_page(&self, page_num: u32) -> Result<String, McpError> {
        let pages = self
            .pages
            .get_or_try_init(|| self.load_manifest())
            .await?;

        let id = pages
            .get(&page_num)
            .ok_or(McpError::PageNotFound(page_num))?;

        let url = format!("{}/pages/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| McpError::Upstream(e.to_string()))?;
        if !response.status().is_success() {
            return Err(McpError::Upstream(format!(
                "GET {url} returned {}",
                response.status()
            )));
        }
        response
            .text()
            .await
            .map_err(|e| McpError::Upstream(e.to_string()))
    }

    async fn load_manifest(&self) -> Result<HashMap<u32, String>, McpError> {
        let url = format!("{}/pages.json", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| McpError::Upstream(e.to_string()))?;
        if !response.status().is_success() {
            return Err(McpError::Upstream(format!(
                "GET {url} returned {}",
                response.status()
            )));
        }
        let entries: Vec<ManifestEntry> = response
            .json()
            .await
            .map_err(|e| McpError::Upstream(format!("invalid manifest: {e}")))?;

        let mut pages = HashMap::with_capacity(entries.len());
        for entry in entries {
            match page_number(&entry.id) {
                Some(num) => {
                    pages.insert(num, entry.id);
                }
                None => {
                    // Unaddressable by number; skip rather than fail the load.
                    tracing::warn!(id = %entry.id, "manifest id has no numeric prefix, skipping");
                }
            }
        }
        tracing::info!(pages = pages.len(), "loaded page manifest");
        Ok(pages)
    }
}

/// Parse the numeric prefix of a resource id, up to the first `-`.
fn page_number(id: &str) -> Option<u32> {
    id.split('-').next()?.parse().ok()
}
