use thiserror::Error;

use crate::extraction::templates::TemplateError;
use crate::jobs::JobError;
use crate::storage::vector::VectorStoreError;
use crate::types::embeddings::EmbeddingError;
use crate::types::llm::LLMError;

/// Crate-wide error type.
///
/// Failures follow the pipeline's taxonomy: `Extraction` is fatal for the
/// submitted document, `ExternalService` is fatal for the step that raised it
/// and is never retried, and per-field validation findings are carried inside
/// the job result rather than raised here.
#[derive(Debug, Error)]
pub enum Error {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed or unreadable document
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Text-generation, embedding, or vector-store call failed
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Validation setup errors (bad rule patterns, not per-field findings)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Job store errors
    #[error("Job error: {0}")]
    Job(#[from] JobError),

    /// Template store errors
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

// External collaborators surface through a single variant so the coordinator
// can treat any of them as a fatal step failure.
impl From<LLMError> for Error {
    fn from(err: LLMError) -> Self {
        Error::ExternalService(err.to_string())
    }
}

impl From<EmbeddingError> for Error {
    fn from(err: EmbeddingError) -> Self {
        Error::ExternalService(err.to_string())
    }
}

impl From<VectorStoreError> for Error {
    fn from(err: VectorStoreError) -> Self {
        Error::ExternalService(err.to_string())
    }
}
