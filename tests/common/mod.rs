//! Shared test doubles for the pipeline seams.
#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

use nanoform::embeddings::{EmbeddingConfig, EmbeddingError, EmbeddingProvider, EmbeddingResponse};
use nanoform::llm::{LLMError, LLMParams, LLMResponse, Provider, ProviderConfig};

/// Install a per-test log subscriber; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Scripted model provider: returns canned responses in order and records
/// every prompt it receives.
pub struct MockProvider {
    config: ProviderConfig,
    responses: Mutex<Vec<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub fail: bool,
}

impl MockProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            config: ProviderConfig {
                model: "mock-model".to_string(),
                ..Default::default()
            },
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            prompts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        let mut provider = Self::new(vec![]);
        provider.fail = true;
        provider
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, prompt: &str, _params: &LLMParams) -> Result<LLMResponse, LLMError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(LLMError::RequestFailed("mock provider down".to_string()));
        }
        let mut responses = self.responses.lock().unwrap();
        let text = if responses.is_empty() {
            "{}".to_string()
        } else {
            responses.remove(0)
        };
        Ok(LLMResponse {
            text,
            tokens_used: 10,
            model: "mock-model".to_string(),
            metadata: Default::default(),
        })
    }

    fn get_config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Deterministic embedder: hashes the text into a small fixed-dimension
/// vector, so identical texts always embed identically.
pub struct MockEmbeddingProvider {
    config: EmbeddingConfig,
}

impl MockEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            config: EmbeddingConfig {
                model: "mock-embed".to_string(),
                dimension,
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<EmbeddingResponse, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("empty text".to_string()));
        }
        let dim = self.config.dimension;
        let mut vector = vec![0.0f32; dim];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % dim] += byte as f32 / 255.0;
        }
        Ok(EmbeddingResponse {
            embedding: vector,
            tokens_used: text.len() / 4,
            model: "mock-embed".to_string(),
        })
    }

    fn get_config(&self) -> &EmbeddingConfig {
        &self.config
    }
}
