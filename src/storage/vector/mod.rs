//! Vector storage trait and implementations.
//!
//! [`QdrantVectorStore`] speaks the Qdrant REST API over HTTP;
//! [`MemoryVectorStore`] is an in-process store for tests and small runs.

mod memory;
mod qdrant;

pub use memory::MemoryVectorStore;
pub use qdrant::QdrantVectorStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from vector store operations.
#[derive(Error, Debug)]
pub enum VectorStoreError {
    /// The request could not be completed
    #[error("Vector store request failed: {0}")]
    RequestFailed(String),
    /// The named collection does not exist
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// The store returned something unusable
    #[error("Invalid vector store response: {0}")]
    InvalidResponse(String),
    /// A vector's dimension does not match the collection
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Collection dimension
        expected: usize,
        /// Supplied vector dimension
        actual: usize,
    },
}

/// Distance metric used when a collection is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Cosine similarity
    Cosine,
    /// Euclidean distance
    Euclid,
    /// Dot product
    Dot,
}

impl DistanceMetric {
    /// Wire name used by Qdrant.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "Cosine",
            DistanceMetric::Euclid => "Euclid",
            DistanceMetric::Dot => "Dot",
        }
    }
}

/// One stored vector with its payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorPoint {
    /// Stable point id
    pub id: String,
    /// Embedding vector
    pub vector: Vec<f32>,
    /// Arbitrary JSON payload stored alongside the vector
    pub payload: serde_json::Value,
}

/// A search hit with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    /// Point id
    pub id: String,
    /// Similarity score (higher is closer for cosine/dot)
    pub score: f32,
    /// Stored payload
    pub payload: serde_json::Value,
}

/// Collection-level counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Number of points in the collection
    pub points_count: u64,
}

/// Abstract vector store.
///
/// Implementations must be safe to share across tasks.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not exist. Idempotent.
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<(), VectorStoreError>;

    /// Insert or overwrite points by id.
    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<(), VectorStoreError>;

    /// Nearest-neighbour search.
    ///
    /// `score_threshold` drops hits below the given similarity;
    /// `filter` keeps only points whose payload contains the given
    /// key/value pairs.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        score_threshold: Option<f32>,
        filter: Option<&serde_json::Value>,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError>;

    /// Delete points by id.
    async fn delete(&self, collection: &str, ids: &[String]) -> Result<(), VectorStoreError>;

    /// Collection counters.
    async fn stats(&self, collection: &str) -> Result<CollectionStats, VectorStoreError>;
}
