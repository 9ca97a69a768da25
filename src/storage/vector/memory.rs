use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CollectionStats, DistanceMetric, ScoredPoint, VectorPoint, VectorStore, VectorStoreError};

struct MemoryCollection {
    dimension: usize,
    metric: DistanceMetric,
    points: HashMap<String, VectorPoint>,
}

/// In-process vector store with exhaustive cosine search.
///
/// Intended for tests and small single-process runs; it holds every
/// vector in memory behind an async lock.
#[derive(Default)]
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl MemoryVectorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn similarity(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        match metric {
            DistanceMetric::Dot => dot,
            DistanceMetric::Cosine => {
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    0.0
                } else {
                    dot / (norm_a * norm_b)
                }
            }
            DistanceMetric::Euclid => {
                let dist: f32 = a
                    .iter()
                    .zip(b.iter())
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum::<f32>()
                    .sqrt();
                // Negated so that higher is always closer.
                -dist
            }
        }
    }

    fn matches_filter(payload: &serde_json::Value, filter: &serde_json::Value) -> bool {
        filter
            .as_object()
            .map(|object| object.iter().all(|(key, value)| payload.get(key) == Some(value)))
            .unwrap_or(true)
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<(), VectorStoreError> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_insert_with(|| MemoryCollection {
            dimension,
            metric,
            points: HashMap::new(),
        });
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<(), VectorStoreError> {
        let mut collections = self.collections.write().await;
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| VectorStoreError::CollectionNotFound(collection.to_string()))?;
        for point in points {
            if point.vector.len() != entry.dimension {
                return Err(VectorStoreError::DimensionMismatch {
                    expected: entry.dimension,
                    actual: point.vector.len(),
                });
            }
            entry.points.insert(point.id.clone(), point);
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        score_threshold: Option<f32>,
        filter: Option<&serde_json::Value>,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError> {
        let collections = self.collections.read().await;
        let entry = collections
            .get(collection)
            .ok_or_else(|| VectorStoreError::CollectionNotFound(collection.to_string()))?;
        if vector.len() != entry.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: entry.dimension,
                actual: vector.len(),
            });
        }

        let mut hits: Vec<ScoredPoint> = entry
            .points
            .values()
            .filter(|point| {
                filter
                    .map(|f| Self::matches_filter(&point.payload, f))
                    .unwrap_or(true)
            })
            .map(|point| ScoredPoint {
                id: point.id.clone(),
                score: Self::similarity(entry.metric, vector, &point.vector),
                payload: point.payload.clone(),
            })
            .filter(|hit| score_threshold.map(|t| hit.score >= t).unwrap_or(true))
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<(), VectorStoreError> {
        let mut collections = self.collections.write().await;
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| VectorStoreError::CollectionNotFound(collection.to_string()))?;
        for id in ids {
            entry.points.remove(id);
        }
        Ok(())
    }

    async fn stats(&self, collection: &str) -> Result<CollectionStats, VectorStoreError> {
        let collections = self.collections.read().await;
        let entry = collections
            .get(collection)
            .ok_or_else(|| VectorStoreError::CollectionNotFound(collection.to_string()))?;
        Ok(CollectionStats {
            points_count: entry.points.len() as u64,
        })
    }
}
