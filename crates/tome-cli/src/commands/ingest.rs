//! Ingest command: build a collection snapshot from a JSON document set.
//!
//! Input is a JSON array of `{id, content, metadata?}` objects. Every
//! content is embedded with the local model and the collection is written as
//! one snapshot file that `tome serve` loads at startup.

use anyhow::Context;
use clap::Args;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tome_index::{Embedder, Snapshot, SnapshotDoc};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    content: String,
    #[serde(default)]
    metadata: Map<String, Value>,
}

/// Arguments for `tome ingest`.
#[derive(Debug, Args)]
pub struct IngestArgs {
    /// JSON file with an array of {id, content, metadata?} documents.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Collection name for the snapshot.
    #[arg(long, default_value = "knowledge_base")]
    pub collection: String,

    /// Directory to write the snapshot into.
    #[arg(long, default_value = "snapshots")]
    pub out_dir: PathBuf,
}

pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let docs: Vec<InputDoc> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;
    anyhow::ensure!(!docs.is_empty(), "input contains no documents");

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    let out_path = args.out_dir.join(format!("{}.json", args.collection));

    let collection = args.collection;
    let snapshot = tokio::task::spawn_blocking(move || -> anyhow::Result<Snapshot> {
        let embedder = Embedder::load()?;
        let texts: Vec<String> = docs.iter().map(|doc| doc.content.clone()).collect();
        let embeddings = embedder.embed(texts)?;

        let documents = docs
            .into_iter()
            .zip(embeddings)
            .map(|(doc, embedding)| SnapshotDoc {
                id: doc.id,
                content: doc.content,
                metadata: doc.metadata,
                embedding,
            })
            .collect();

        Ok(Snapshot {
            collection,
            model: embedder.model_name().to_string(),
            documents,
        })
    })
    .await
    .context("ingest task failed")??;

    snapshot
        .write(&out_path)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    println!(
        "Wrote {} documents to {}",
        snapshot.documents.len(),
        out_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_metadata_is_optional() {
        let docs: Vec<InputDoc> = serde_json::from_str(
            r#"[
                {"id": "42-interrupts", "content": "INT 21h services"},
                {"id": "7-memory", "content": "memory map", "metadata": {"title": "Memory"}}
            ]"#,
        )
        .unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].metadata.is_empty());
        assert_eq!(docs[1].metadata["title"], "Memory");
    }
}
