//! Text-generation providers used for model field extraction and answering.

// Re-export common types from types module
pub use crate::types::llm::{LLMError, LLMParams, LLMResponse};

/// Provider trait and configuration shared by all text-generation backends.
pub mod provider;

/// Module containing implementations for different LLM providers.
///
/// Supported providers:
/// - Ollama: for local model deployment
pub mod providers;

pub use provider::{Provider, ProviderConfig};
pub use providers::*;
