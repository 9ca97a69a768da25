use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::llm::{LLMError, LLMParams, LLMResponse, Provider, ProviderConfig};

/// Ollama API response format
#[derive(Debug, Deserialize)]
pub struct OllamaResponse {
    /// The generated text response
    pub response: String,

    /// Whether the generation is complete
    #[allow(dead_code)]
    pub done: bool,

    /// Number of tokens in the response
    pub eval_count: Option<usize>,

    /// Total duration of the request in microseconds
    pub total_duration: Option<u64>,

    /// Error message if any
    pub error: Option<String>,
}

/// Map Ollama errors to LLMError
fn map_ollama_error(error: &str) -> LLMError {
    if error.contains("rate limit") || error.contains("too many requests") {
        LLMError::RateLimitExceeded(error.to_string())
    } else if error.contains("context length") || error.contains("token limit") {
        LLMError::TokenLimitExceeded(error.to_string())
    } else if error.contains("model") && (error.contains("not found") || error.contains("failed to load")) {
        LLMError::ConfigError(format!("Model error: {}", error))
    } else if error.contains("invalid") {
        LLMError::InvalidResponse(error.to_string())
    } else {
        LLMError::RequestFailed(error.to_string())
    }
}

/// Ollama provider implementation
pub struct OllamaProvider {
    config: ProviderConfig,
    client: Client,
}

impl OllamaProvider {
    /// Create a provider with a fixed request timeout taken from the config.
    pub fn new(config: ProviderConfig) -> Result<Self, LLMError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::ConfigError(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn api_base(&self) -> &str {
        self.config.api_endpoint.as_deref().unwrap_or("http://localhost:11434")
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(&self, prompt: &str, params: &LLMParams) -> Result<LLMResponse, LLMError> {
        let url = format!("{}/api/generate", self.api_base());
        debug!(model = %params.model, "sending generation request");

        let mut request_body = json!({
            "model": params.model.strip_prefix("ollama/").unwrap_or(&params.model),
            "prompt": prompt,
            "temperature": params.temperature,
            "top_p": params.top_p,
            "stream": false,
            "options": { "num_predict": params.max_tokens },
        });

        // Add system prompt if provided
        if let Some(system) = &params.system_prompt {
            request_body["system"] = json!(system);
        }

        // Add extra parameters
        for (key, value) in &params.extra_params {
            request_body[key] = json!(value);
        }

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(LLMError::from)?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(LLMError::RequestFailed(error));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LLMError::InvalidResponse(e.to_string()))?;

        if let Some(error) = ollama_response.error {
            return Err(map_ollama_error(&error));
        }

        Ok(LLMResponse {
            text: ollama_response.response,
            tokens_used: ollama_response.eval_count.unwrap_or(0),
            model: params.model.clone(),
            metadata: HashMap::new(),
        })
    }

    fn get_config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            map_ollama_error("rate limit exceeded"),
            LLMError::RateLimitExceeded(_)
        ));
        assert!(matches!(
            map_ollama_error("model llama3 not found"),
            LLMError::ConfigError(_)
        ));
        assert!(matches!(
            map_ollama_error("context length exceeded"),
            LLMError::TokenLimitExceeded(_)
        ));
        assert!(matches!(map_ollama_error("connection reset"), LLMError::RequestFailed(_)));
    }
}
