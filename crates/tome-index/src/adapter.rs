//! Async adapter over a blocking vector search engine.
//!
//! [`IndexAdapter`] owns the worker pool and a shared engine handle. Every
//! engine call is shipped to the pool and awaited over a oneshot channel; if
//! the awaiting request goes away mid-call, the job still completes on the
//! worker and the reply is discarded.

use crate::error::IndexError;
use crate::pool::WorkerPool;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Blocking interface to a vector search engine.
///
/// Implementations may block for as long as they like; callers only reach
/// them through [`IndexAdapter`], which keeps blocking work off the async
/// runtime. Errors are engine-specific strings and are never retried.
pub trait VectorIndex: Send + Sync + 'static {
    /// Number of documents stored in the searchable collection.
    fn count(&self) -> Result<usize, IndexError>;

    /// The `limit` nearest documents to `text`, ascending by distance.
    /// `limit` must not exceed [`count`](Self::count).
    fn query(&self, text: &str, limit: usize) -> Result<Vec<RawMatch>, IndexError>;

    /// Names of all collections, in the engine's natural enumeration order.
    fn collections(&self) -> Result<Vec<String>, IndexError>;
}

/// A single match as produced by the engine, before shaping.
#[derive(Debug, Clone)]
pub struct RawMatch {
    pub id: String,
    pub content: String,
    pub metadata: Option<Map<String, Value>>,
    pub distance: f64,
}

/// A shaped search result with the stable output schema.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub content: String,
    /// Always an object; engines reporting no metadata get `{}`.
    pub metadata: Map<String, Value>,
    /// Cosine distance rounded to 4 decimals, lower = more similar.
    pub distance: f64,
}

impl SearchResult {
    fn from_raw(raw: RawMatch) -> Self {
        Self {
            id: raw.id,
            content: raw.content,
            metadata: raw.metadata.unwrap_or_default(),
            distance: round4(raw.distance),
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Async handle on the engine.
#[derive(Clone)]
pub struct IndexAdapter {
    engine: Arc<dyn VectorIndex>,
    pool: Arc<WorkerPool>,
}

impl IndexAdapter {
    /// Wrap an engine with a worker pool of the given size.
    pub fn new(engine: Arc<dyn VectorIndex>, workers: usize) -> std::io::Result<Self> {
        Ok(Self {
            engine,
            pool: Arc::new(WorkerPool::new(workers)?),
        })
    }

    /// Search for the `n_results` nearest documents.
    ///
    /// The engine rejects limits above its stored document count, so the
    /// count is queried first and `n_results` clamped to `[0, count]`. An
    /// empty index yields an empty result, not an error.
    pub async fn search(&self, query: &str, n_results: i64) -> Result<Vec<SearchResult>, IndexError> {
        let count = self.run(|engine| engine.count()).await?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let limit = n_results.clamp(0, count as i64) as usize;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let text = query.to_string();
        let raw = self.run(move |engine| engine.query(&text, limit)).await?;
        Ok(raw.into_iter().map(SearchResult::from_raw).collect())
    }

    /// List collection names.
    pub async fn list_collections(&self) -> Result<Vec<String>, IndexError> {
        self.run(|engine| engine.collections()).await
    }

    async fn run<T, F>(&self, job: F) -> Result<T, IndexError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn VectorIndex) -> Result<T, IndexError> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let (tx, rx) = oneshot::channel();
        self.pool.execute(move || {
            // The receiver may be gone if the caller was dropped; the job has
            // already run to completion either way.
            let _ = tx.send(job(engine.as_ref()));
        })?;
        rx.await.map_err(|_| IndexError::PoolClosed)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Fixed-corpus engine: distance of document `i` is `i / 10`.
    struct FakeEngine {
        docs: usize,
    }

    impl VectorIndex for FakeEngine {
        fn count(&self) -> Result<usize, IndexError> {
            Ok(self.docs)
        }

        fn query(&self, _text: &str, limit: usize) -> Result<Vec<RawMatch>, IndexError> {
            if limit > self.docs {
                return Err(IndexError::Engine(format!(
                    "requested {limit} results from {} documents",
                    self.docs
                )));
            }
            Ok((0..limit)
                .map(|i| RawMatch {
                    id: format!("{i}-doc"),
                    content: format!("document {i}"),
                    metadata: if i % 2 == 0 {
                        Some(
                            json!({"source": format!("page-{i}")})
                                .as_object()
                                .cloned()
                                .unwrap(),
                        )
                    } else {
                        None
                    },
                    distance: i as f64 / 10.0 + 0.000049,
                })
                .collect())
        }

        fn collections(&self) -> Result<Vec<String>, IndexError> {
            Ok(vec!["knowledge_base".to_string()])
        }
    }

    fn adapter(docs: usize) -> IndexAdapter {
        IndexAdapter::new(Arc::new(FakeEngine { docs }), 2).unwrap()
    }

    #[tokio::test]
    async fn clamps_n_results_to_count() {
        let results = adapter(3).search("anything", 50).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn empty_index_returns_empty_not_error() {
        let results = adapter(0).search("anything", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn negative_n_results_clamps_to_zero() {
        let results = adapter(3).search("anything", -2).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn distances_ascend_and_are_rounded() {
        let results = adapter(5).search("anything", 5).await.unwrap();
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
        // 0.000049 of engine noise disappears in the 4-decimal rounding
        assert_eq!(results[0].distance, 0.0);
        assert_eq!(results[1].distance, 0.1);
    }

    #[tokio::test]
    async fn missing_metadata_becomes_empty_object() {
        let results = adapter(2).search("anything", 2).await.unwrap();
        assert_eq!(results[0].metadata["source"], "page-0");
        assert!(results[1].metadata.is_empty());
    }

    #[tokio::test]
    async fn list_collections_passes_through() {
        let names = adapter(1).list_collections().await.unwrap();
        assert_eq!(names, vec!["knowledge_base"]);
    }

    #[tokio::test]
    async fn concurrent_searches_do_not_interfere() {
        let adapter = adapter(4);
        let (a, b, c) = tokio::join!(
            adapter.search("one", 4),
            adapter.search("two", 2),
            adapter.list_collections(),
        );
        assert_eq!(a.unwrap().len(), 4);
        assert_eq!(b.unwrap().len(), 2);
        assert_eq!(c.unwrap(), vec!["knowledge_base"]);
    }
}
