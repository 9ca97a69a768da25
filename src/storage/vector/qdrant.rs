use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{CollectionStats, DistanceMetric, ScoredPoint, VectorPoint, VectorStore, VectorStoreError};

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Deserialize)]
struct SearchEnvelope {
    result: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    id: serde_json::Value,
    score: f32,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Deserialize)]
struct CollectionEnvelope {
    result: CollectionInfo,
}

#[derive(Deserialize)]
struct CollectionInfo {
    #[serde(default)]
    points_count: u64,
}

/// Qdrant-backed vector store using its REST API.
pub struct QdrantVectorStore {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl QdrantVectorStore {
    /// Connect to a Qdrant instance at `base_url` (e.g. `http://localhost:6333`).
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, VectorStoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| VectorStoreError::RequestFailed(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, api_key, client })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key);
        }
        builder
    }

    async fn check_status(
        response: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, VectorStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(VectorStoreError::CollectionNotFound(context.to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        Err(VectorStoreError::RequestFailed(format!(
            "{}: HTTP {}: {}",
            context, status, body
        )))
    }

    fn point_id_string(id: &serde_json::Value) -> String {
        match id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn build_filter(filter: &serde_json::Value) -> serde_json::Value {
        let conditions: Vec<serde_json::Value> = filter
            .as_object()
            .map(|object| {
                object
                    .iter()
                    .map(|(key, value)| json!({"key": key, "match": {"value": value}}))
                    .collect()
            })
            .unwrap_or_default();
        json!({ "must": conditions })
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<(), VectorStoreError> {
        let body = json!({
            "vectors": { "size": dimension, "distance": metric.as_str() }
        });
        let response = self
            .request(reqwest::Method::PUT, &format!("/collections/{}", name))
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorStoreError::RequestFailed(e.to_string()))?;

        // An already-existing collection comes back as a conflict.
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Ok(()),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(VectorStoreError::RequestFailed(format!(
                    "create collection {}: HTTP {}: {}",
                    name, status, body
                )))
            }
        }
    }

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<(), VectorStoreError> {
        if points.is_empty() {
            return Ok(());
        }
        let wire_points: Vec<serde_json::Value> = points
            .iter()
            .map(|p| json!({"id": p.id, "vector": p.vector, "payload": p.payload}))
            .collect();
        debug!(collection, count = wire_points.len(), "upserting points");

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{}/points?wait=true", collection),
            )
            .json(&json!({ "points": wire_points }))
            .send()
            .await
            .map_err(|e| VectorStoreError::RequestFailed(e.to_string()))?;
        Self::check_status(response, collection).await?;
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
        let mut body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });
        if let Some(threshold) = score_threshold {
            body["score_threshold"] = json!(threshold);
        }
        if let Some(filter) = filter {
            body["filter"] = Self::build_filter(filter);
        }

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{}/points/search", collection),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorStoreError::RequestFailed(e.to_string()))?;
        let response = Self::check_status(response, collection).await?;

        let envelope: SearchEnvelope = response
            .json()
            .await
            .map_err(|e| VectorStoreError::InvalidResponse(e.to_string()))?;

        Ok(envelope
            .result
            .into_iter()
            .map(|hit| ScoredPoint {
                id: Self::point_id_string(&hit.id),
                score: hit.score,
                payload: hit.payload,
            })
            .collect())
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<(), VectorStoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{}/points/delete?wait=true", collection),
            )
            .json(&json!({ "points": ids }))
            .send()
            .await
            .map_err(|e| VectorStoreError::RequestFailed(e.to_string()))?;
        Self::check_status(response, collection).await?;
        Ok(())
    }

    async fn stats(&self, collection: &str) -> Result<CollectionStats, VectorStoreError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/collections/{}", collection))
            .send()
            .await
            .map_err(|e| VectorStoreError::RequestFailed(e.to_string()))?;
        let response = Self::check_status(response, collection).await?;

        let envelope: CollectionEnvelope = response
            .json()
            .await
            .map_err(|e| VectorStoreError::InvalidResponse(e.to_string()))?;
        Ok(CollectionStats {
            points_count: envelope.result.points_count,
        })
    }
}
