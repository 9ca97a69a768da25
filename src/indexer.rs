//! Embeds extracted document content and writes it to a vector store.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::storage::vector::{DistanceMetric, VectorPoint, VectorStore};
use crate::types::{EmbeddingProvider, Error, ExtractedField, Result};
use crate::utils::compute_content_hash_id;

/// Metadata stored alongside a document's embedding.
#[derive(Debug, Clone)]
pub struct DocumentIndexMetadata {
    /// Caller-supplied sample identifier
    pub sample_id: Option<String>,
    /// Original file name
    pub file_name: String,
    /// Size in bytes
    pub file_size: u64,
    /// Declared MIME type
    pub mime_type: String,
    /// Processing flavour the document went through
    pub processing_type: String,
    /// Pages in the source document
    pub page_count: usize,
}

/// Turns document text plus extracted fields into a stored vector point.
pub struct EmbeddingIndexer {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
    vector_dim: usize,
}

impl EmbeddingIndexer {
    /// Wire up an indexer for one collection.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        vector_dim: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: collection.into(),
            vector_dim,
        }
    }

    /// Embed the document text and upsert it with its fields and metadata.
    ///
    /// The point id is a stable hash of the content, so re-indexing the same
    /// document overwrites the previous point instead of duplicating it.
    pub async fn index_document(
        &self,
        text: &str,
        fields: &[ExtractedField],
        metadata: &DocumentIndexMetadata,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("cannot index empty document text".to_string()));
        }

        self.store
            .ensure_collection(&self.collection, self.vector_dim, DistanceMetric::Cosine)
            .await?;

        let response = self.embedder.embed(text).await?;
        debug!(model = %response.model, dim = response.embedding.len(), "document embedded");

        let field_map: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|f| (f.field_name.clone(), json!(f.value)))
            .collect();

        let id = compute_content_hash_id(text, "doc-");
        let payload = json!({
            "text": text,
            "title": metadata.file_name,
            "fields": field_map,
            "sample_id": metadata.sample_id,
            "file_name": metadata.file_name,
            "file_size": metadata.file_size,
            "mime_type": metadata.mime_type,
            "processing_type": metadata.processing_type,
            "page_count": metadata.page_count,
        });

        self.store
            .upsert(
                &self.collection,
                vec![VectorPoint {
                    id: id.clone(),
                    vector: response.embedding,
                    payload,
                }],
            )
            .await?;

        info!(point_id = %id, collection = %self.collection, "document indexed");
        Ok(id)
    }
}
