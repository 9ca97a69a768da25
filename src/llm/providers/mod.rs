/// Ollama provider implementation
pub mod ollama;

pub use ollama::OllamaProvider;
