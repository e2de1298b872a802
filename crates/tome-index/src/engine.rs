//! Snapshot-backed vector engine.
//!
//! Collections are prebuilt offline (`tome ingest`) and persisted as one JSON
//! snapshot per collection: document ids, contents, metadata, and their
//! embeddings. At query time the engine embeds the query text with a local
//! model and scores every document of the searchable collection by cosine
//! distance. This is deliberately a linear scan — approximate indexes live
//! behind the [`VectorIndex`](crate::VectorIndex) trait, not here.

use crate::adapter::{RawMatch, VectorIndex};
use crate::error::IndexError;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tome_core::config::IndexConfig;

/// Model used for both ingestion and query embedding.
const EMBED_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Local embedding model. Calls are serialized through a mutex; concurrency
/// above that is bounded by the adapter's worker pool.
pub struct Embedder {
    model: Mutex<TextEmbedding>,
}

impl Embedder {
    /// Load the embedding model (downloads to the local cache on first use).
    pub fn load() -> Result<Self, IndexError> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .map_err(|e| IndexError::Engine(format!("failed to load embedding model: {e}")))?;
        Ok(Self {
            model: Mutex::new(model),
        })
    }

    /// Name recorded in snapshots produced with this embedder.
    pub fn model_name(&self) -> &'static str {
        EMBED_MODEL_NAME
    }

    /// Embed a batch of texts.
    pub fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, IndexError> {
        let model = self
            .model
            .lock()
            .map_err(|_| IndexError::Engine("embedding model mutex poisoned".to_string()))?;
        model
            .embed(texts, None)
            .map_err(|e| IndexError::Engine(format!("embedding failed: {e}")))
    }
}

/// One persisted collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub collection: String,
    /// Embedding model the documents were embedded with.
    pub model: String,
    pub documents: Vec<SnapshotDoc>,
}

/// One document with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDoc {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub embedding: Vec<f32>,
}

impl Snapshot {
    /// Read a snapshot file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| IndexError::SnapshotLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| IndexError::SnapshotLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Write a snapshot file.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        let path = path.as_ref();
        let contents = serde_json::to_string(self).map_err(|e| IndexError::SnapshotLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, contents).map_err(|e| IndexError::SnapshotLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Engine over loaded snapshots.
pub struct SnapshotEngine {
    collections: HashMap<String, Vec<SnapshotDoc>>,
    search_collection: String,
    embedder: Embedder,
}

impl SnapshotEngine {
    /// Load every `*.json` snapshot under the configured directory and the
    /// embedding model. A missing directory serves an empty index.
    pub fn open(config: &IndexConfig) -> Result<Self, IndexError> {
        let embedder = Embedder::load()?;
        let mut collections = HashMap::new();

        match std::fs::read_dir(&config.snapshot_dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("json") {
                        continue;
                    }
                    let snapshot = Snapshot::read(&path)?;
                    if snapshot.model != embedder.model_name() {
                        tracing::warn!(
                            collection = %snapshot.collection,
                            snapshot_model = %snapshot.model,
                            runtime_model = %embedder.model_name(),
                            "snapshot embedded with a different model; distances will be meaningless"
                        );
                    }
                    tracing::info!(
                        collection = %snapshot.collection,
                        documents = snapshot.documents.len(),
                        "loaded collection snapshot"
                    );
                    collections.insert(snapshot.collection, snapshot.documents);
                }
            }
            Err(e) => {
                tracing::warn!(
                    dir = %config.snapshot_dir.display(),
                    error = %e,
                    "snapshot directory unreadable, serving an empty index"
                );
            }
        }

        Ok(Self {
            collections,
            search_collection: config.collection.clone(),
            embedder,
        })
    }

    fn searchable(&self) -> &[SnapshotDoc] {
        self.collections
            .get(&self.search_collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl VectorIndex for SnapshotEngine {
    fn count(&self) -> Result<usize, IndexError> {
        Ok(self.searchable().len())
    }

    fn query(&self, text: &str, limit: usize) -> Result<Vec<RawMatch>, IndexError> {
        let docs = self.searchable();
        if limit > docs.len() {
            return Err(IndexError::Engine(format!(
                "requested {limit} results from a collection of {}",
                docs.len()
            )));
        }

        let query = self
            .embedder
            .embed(vec![text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| IndexError::Engine("embedding returned no vector".to_string()))?;

        let mut scored = Vec::with_capacity(docs.len());
        for doc in docs {
            if doc.embedding.len() != query.len() {
                return Err(IndexError::Engine(format!(
                    "document {} has dimension {}, query has {}",
                    doc.id,
                    doc.embedding.len(),
                    query.len()
                )));
            }
            scored.push((cosine_distance(&query, &doc.embedding), doc));
        }
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(distance, doc)| RawMatch {
                id: doc.id.clone(),
                content: doc.content.clone(),
                metadata: if doc.metadata.is_empty() {
                    None
                } else {
                    Some(doc.metadata.clone())
                },
                distance,
            })
            .collect())
    }

    fn collections(&self) -> Result<Vec<String>, IndexError> {
        Ok(self.collections.keys().cloned().collect())
    }
}

/// Cosine distance: `1 - cos(a, b)`. Zero-norm vectors are maximally distant.
fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}
