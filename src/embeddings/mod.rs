//! Embedding providers used for document indexing and retrieval.

/// Ollama embeddings provider implementation
pub mod ollama;

// Re-export providers
pub use ollama::OllamaEmbeddingProvider;

// Re-export core types from types::embeddings
pub use crate::types::embeddings::*;
