//! Core types and configuration for nanoform

use serde::{Deserialize, Serialize};

// Submodules
/// Language model (LLM) types and interfaces.
///
/// This module provides:
/// - Common types for LLM interactions
/// - Parameter and response structures
/// - Error types specific to LLM operations
pub mod llm;

/// Embedding types and interfaces.
///
/// This module provides:
/// - Common types for embedding operations
/// - Provider trait definitions
/// - Error types specific to embedding operations
pub mod embeddings;

/// Crate-wide error and result types.
pub mod error;

/// Extracted-field and job-result data types.
pub mod fields;

// Re-exports
pub use embeddings::{EmbeddingConfig, EmbeddingError, EmbeddingProvider, EmbeddingResponse};
pub use error::{Error, Result};
pub use fields::{BoundingBox, ConfidenceLevel, ExtractedField, ExtractionOutcome, FieldSource};
pub use llm::{LLMError, LLMParams, LLMResponse};

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the text-generation service
    pub generation_endpoint: String,

    /// Model used for field extraction and answering
    pub generation_model: String,

    /// Model used for embedding generation
    pub embedding_model: String,

    /// Base URL of the vector store
    pub vector_store_url: String,

    /// API key for the vector store, if required
    pub vector_store_api_key: Option<String>,

    /// Collection holding indexed documents
    pub collection: String,

    /// Vector dimension for embeddings
    pub vector_dim: usize,

    /// Timeout for generation and embedding calls, in seconds
    pub request_timeout_secs: u64,

    /// Output-token budget for field extraction calls
    pub max_extraction_tokens: usize,

    /// Output-token budget for retrieval answers
    pub max_answer_tokens: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation_endpoint: "http://localhost:11434".to_string(),
            generation_model: "llama3".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            vector_store_url: "http://localhost:6333".to_string(),
            vector_store_api_key: None,
            collection: "nanoform_documents".to_string(),
            vector_dim: 768,
            request_timeout_secs: 30,
            max_extraction_tokens: 1000,
            max_answer_tokens: 500,
        }
    }
}
