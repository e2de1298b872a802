//! Error types for the index crate.

use thiserror::Error;

/// Errors that can occur while talking to the vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The engine itself failed (embedding, storage, metric mismatch).
    /// Not retried; surfaced to the caller as a search-engine failure.
    #[error("search engine error: {0}")]
    Engine(String),

    /// A snapshot file could not be read or parsed.
    #[error("failed to load snapshot {path}: {reason}")]
    SnapshotLoad { path: String, reason: String },

    /// The worker pool has shut down and can no longer accept jobs.
    #[error("index worker pool is closed")]
    PoolClosed,
}
