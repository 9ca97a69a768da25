use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::llm::{LLMError, LLMParams, LLMResponse};

/// Configuration for an LLM provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API endpoint override
    pub api_endpoint: Option<String>,

    /// API key (if required)
    pub api_key: Option<String>,

    /// Default model to use
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Provider-specific parameters
    pub extra_params: HashMap<String, String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_endpoint: None,
            api_key: None,
            model: "llama3".to_string(),
            timeout_secs: 30,
            extra_params: HashMap::new(),
        }
    }
}

/// Trait for LLM provider implementations
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate text completion
    async fn complete(&self, prompt: &str, params: &LLMParams) -> Result<LLMResponse, LLMError>;

    /// Get provider configuration
    fn get_config(&self) -> &ProviderConfig;
}
