use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::types::embeddings::{EmbeddingConfig, EmbeddingError, EmbeddingProvider, EmbeddingResponse};

/// Ollama API response format for embeddings
#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

/// Ollama embeddings provider implementation
pub struct OllamaEmbeddingProvider {
    /// HTTP client
    client: Client,

    /// Provider configuration
    config: EmbeddingConfig,
}

impl OllamaEmbeddingProvider {
    /// Create a new Ollama embeddings provider
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn api_base(&self) -> &str {
        self.config.api_endpoint.as_deref().unwrap_or("http://localhost:11434")
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<EmbeddingResponse, EmbeddingError> {
        if text.is_empty() {
            return Err(EmbeddingError::InvalidInput("empty text".to_string()));
        }

        let url = format!("{}/api/embeddings", self.api_base());
        debug!(model = %self.config.model, chars = text.len(), "sending embedding request");

        let request_body = json!({
            "model": self.config.model,
            "prompt": text,
        });

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(EmbeddingError::from)?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::RequestFailed(error));
        }

        let ollama_response: OllamaEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        if ollama_response.embedding.is_empty() {
            return Err(EmbeddingError::InvalidResponse("empty embedding vector".to_string()));
        }

        Ok(EmbeddingResponse {
            embedding: ollama_response.embedding,
            // Ollama does not report usage for embeddings; estimate ~4 chars per token
            tokens_used: text.len() / 4,
            model: self.config.model.clone(),
        })
    }

    fn get_config(&self) -> &EmbeddingConfig {
        &self.config
    }
}
