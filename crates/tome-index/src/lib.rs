//! # tome-index
//!
//! The vector search seam for Tome. The engine itself is behind the
//! [`VectorIndex`] trait: a blocking interface that, given a query string and
//! a limit, returns the nearest stored documents with distances. The
//! [`IndexAdapter`] bridges that blocking interface into the async request
//! path through a small bounded worker pool, so a slow engine call never
//! stalls the server's event loop.
//!
//! The shipped engine ([`SnapshotEngine`]) composes a local embedding model
//! with pre-embedded document snapshots on disk, one file per collection.

pub mod adapter;
pub mod engine;
pub mod error;
pub mod pool;

pub use adapter::{IndexAdapter, RawMatch, SearchResult, VectorIndex};
pub use engine::{Embedder, Snapshot, SnapshotDoc, SnapshotEngine};
pub use error::IndexError;
pub use pool::WorkerPool;
