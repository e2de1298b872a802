//! Serve command for starting the MCP server.
//!
//! `tome serve` - Load the config, open the index, serve until ctrl-c.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tome_core::{TokenStore, TomeConfig};
use tome_index::{IndexAdapter, SnapshotEngine};
use tome_mcp::{HttpServer, McpServer, PageDirectory};

/// Arguments for `tome serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Configuration file path.
    #[arg(short, long, default_value = "tome.yaml")]
    pub config: PathBuf,
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = TomeConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;
    anyhow::ensure!(
        !config.knowledge_base.base_url.is_empty(),
        "knowledge_base.base_url must be set in {}",
        args.config.display()
    );

    // Model load and snapshot reads block; keep them off the runtime workers.
    let index_config = config.index.clone();
    let engine = tokio::task::spawn_blocking(move || SnapshotEngine::open(&index_config))
        .await
        .context("engine startup task failed")??;

    let adapter = IndexAdapter::new(Arc::new(engine), config.index.workers)
        .context("failed to start index worker pool")?;
    let pages = PageDirectory::new(
        config.knowledge_base.base_url.clone(),
        Duration::from_secs(config.knowledge_base.fetch_timeout_secs),
    )?;
    let server = Arc::new(McpServer::new(adapter, pages));
    let tokens = Arc::new(TokenStore::new(config.tokens.file.clone()));

    tracing::info!(
        tokens_file = %tokens.path().display(),
        base_url = %config.knowledge_base.base_url,
        "starting tome MCP server"
    );

    HttpServer::new(config.server.host.clone(), config.server.port, server, tokens)
        .run()
        .await?;

    Ok(())
}
