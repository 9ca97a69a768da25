//! Common types for text-generation provider interactions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid response format
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Token limit exceeded
    #[error("Token limit exceeded: {0}")]
    TokenLimitExceeded(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::RequestFailed(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            LLMError::RequestFailed(format!("Connection failed: {}", err))
        } else {
            LLMError::RequestFailed(err.to_string())
        }
    }
}

/// Parameters for LLM requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMParams {
    /// Model identifier
    pub model: String,

    /// Maximum number of tokens to generate
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling parameter
    pub top_p: f32,

    /// Optional system prompt
    pub system_prompt: Option<String>,

    /// Additional provider-specific parameters
    pub extra_params: HashMap<String, String>,
}

impl Default for LLMParams {
    fn default() -> Self {
        Self {
            model: "llama3".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            top_p: 1.0,
            system_prompt: None,
            extra_params: HashMap::new(),
        }
    }
}

/// Response from an LLM completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    /// Generated text
    pub text: String,

    /// Number of tokens used for generation, when reported
    pub tokens_used: usize,

    /// Model that produced the response
    pub model: String,

    /// Additional response metadata
    pub metadata: HashMap<String, String>,
}
