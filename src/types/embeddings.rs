//! Common types and the provider trait for embedding operations.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during embedding operations
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid response from provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EmbeddingError::RequestFailed(format!("Request timed out: {}", err))
        } else {
            EmbeddingError::RequestFailed(err.to_string())
        }
    }
}

/// Configuration for embedding operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model identifier/name
    pub model: String,

    /// API endpoint (if applicable)
    pub api_endpoint: Option<String>,

    /// API key (if required)
    pub api_key: Option<String>,

    /// Timeout in seconds
    pub timeout_secs: u64,

    /// Expected vector dimension of the model's output
    pub dimension: usize,

    /// Additional configuration parameters
    pub extra_config: HashMap<String, String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: String::from("nomic-embed-text"),
            api_endpoint: None,
            api_key: None,
            timeout_secs: 30,
            dimension: 768,
            extra_config: HashMap::new(),
        }
    }
}

/// Response from an embedding call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// The embedding vector
    pub embedding: Vec<f32>,

    /// Number of tokens consumed, when reported
    pub tokens_used: usize,

    /// Model that produced the embedding
    pub model: String,
}

/// Trait for embedding provider implementations
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for the given text
    async fn embed(&self, text: &str) -> Result<EmbeddingResponse, EmbeddingError>;

    /// Get provider configuration
    fn get_config(&self) -> &EmbeddingConfig;
}
