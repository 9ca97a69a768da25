//! Retrieval-augmented question answering over indexed documents.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::llm::{LLMParams, Provider};
use crate::storage::vector::VectorStore;
use crate::types::{EmbeddingProvider, Result};

/// Phrases that mark a hedging answer.
const HEDGING_MARKERS: [&str; 2] = ["i don't know", "not sure"];

/// Retrieval knobs for a question.
#[derive(Debug, Clone)]
pub struct RetrievalParams {
    /// Maximum number of context documents
    pub limit: usize,
    /// Minimum similarity for a document to be used
    pub score_threshold: f32,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            limit: 5,
            score_threshold: 0.4,
        }
    }
}

/// An answer with its supporting context.
#[derive(Debug, Clone)]
pub struct RagAnswer {
    /// Generated answer text
    pub answer: String,
    /// Heuristic confidence in [0, 1]
    pub confidence: f32,
    /// Retrieved source texts used as grounding context, in rank order
    pub sources: Vec<String>,
    /// Wall-clock time to answer, in milliseconds
    pub latency_ms: u64,
}

/// Answers questions by retrieving similar documents and prompting the model
/// with them as context.
pub struct RetrievalAnswerer {
    provider: Arc<dyn Provider>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
    max_tokens: usize,
}

impl RetrievalAnswerer {
    /// Wire up an answerer over one collection.
    pub fn new(
        provider: Arc<dyn Provider>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        max_tokens: usize,
    ) -> Self {
        Self {
            provider,
            embedder,
            store,
            collection: collection.into(),
            max_tokens,
        }
    }

    /// Answer a question, optionally with caller-supplied extra context
    /// prepended to the retrieved documents.
    pub async fn answer(
        &self,
        query: &str,
        extra_context: Option<&str>,
        params: &RetrievalParams,
    ) -> Result<RagAnswer> {
        let start = Instant::now();

        let query_embedding = self.embedder.embed(query).await?;
        let hits = self
            .store
            .search(
                &self.collection,
                &query_embedding.embedding,
                params.limit,
                Some(params.score_threshold),
                None,
            )
            .await?;
        debug!(hits = hits.len(), "retrieved context documents");

        let mut sources = Vec::new();
        let mut context_blocks = Vec::new();
        if let Some(extra) = extra_context {
            if !extra.trim().is_empty() {
                context_blocks.push(extra.to_string());
            }
        }
        for hit in &hits {
            let text = hit
                .payload
                .get("text")
                .and_then(|v| v.as_str())
                .or_else(|| hit.payload.get("title").and_then(|v| v.as_str()));
            match text {
                Some(text) => {
                    context_blocks.push(text.to_string());
                    sources.push(text.to_string());
                }
                // Payload without text or title: the point id is all we have.
                None => sources.push(hit.id.clone()),
            }
        }

        let prompt = build_answer_prompt(query, &context_blocks);
        let llm_params = LLMParams {
            model: self.provider.get_config().model.clone(),
            max_tokens: self.max_tokens,
            temperature: 0.2,
            ..Default::default()
        };
        let response = self.provider.complete(&prompt, &llm_params).await?;
        let answer = response.text.trim().to_string();
        let confidence = answer_confidence(&answer);

        Ok(RagAnswer {
            answer,
            confidence,
            sources,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn build_answer_prompt(query: &str, context_blocks: &[String]) -> String {
    if context_blocks.is_empty() {
        return format!(
            "Answer the following question. If you do not have enough \
             information, say so.\n\nQuestion: {}\n\nAnswer:",
            query
        );
    }
    format!(
        "Use the following documents to answer the question. If the documents \
         do not contain the answer, say so.\n\nDocuments:\n{}\n\nQuestion: {}\n\nAnswer:",
        context_blocks.join("\n---\n"),
        query
    )
}

/// Heuristic confidence for a generated answer.
///
/// Starts at 0.5; longer substantive answers gain, hedging language loses,
/// structured answers (colons or bullet dashes) gain slightly.
pub fn answer_confidence(answer: &str) -> f32 {
    let mut score: f32 = 0.5;
    if answer.len() > 50 {
        score += 0.2;
    }
    let lowered = answer.to_lowercase();
    if HEDGING_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        score -= 0.3;
    }
    if answer.contains(':') || answer.contains('-') {
        score += 0.1;
    }
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_rewards_substantive_answers() {
        let long = "The sample concentration is 42.5 ng/uL according to the submission form: field 3.";
        assert!(answer_confidence(long) > 0.7);
    }

    #[test]
    fn test_confidence_penalizes_hedging() {
        assert!(answer_confidence("I don't know.") < 0.5);
        assert!(answer_confidence("I'm not sure about that.") < 0.5);
    }

    #[test]
    fn test_hedging_confidence_exact_value() {
        // Base 0.5 minus the 0.3 hedging penalty, no bonuses apply.
        assert!((answer_confidence("not sure") - 0.2).abs() < 1e-6);
        assert!((answer_confidence("i don't know") - 0.2).abs() < 1e-6);
        // The penalty is the only deduction, so 0.2 is the floor; the clamp
        // still guarantees the score never leaves [0, 1].
        assert!(answer_confidence("not sure") >= 0.0);
    }

    #[test]
    fn test_confidence_stays_in_unit_interval() {
        assert!(answer_confidence("") >= 0.0);
        let maxed = "a: very long and structured answer that goes on for well over fifty characters total";
        assert!(answer_confidence(maxed) <= 1.0);
    }

    #[test]
    fn test_prompt_includes_context() {
        let prompt = build_answer_prompt("what is x?", &["doc one".to_string()]);
        assert!(prompt.contains("doc one"));
        assert!(prompt.contains("what is x?"));

        let bare = build_answer_prompt("what is x?", &[]);
        assert!(!bare.contains("Documents:"));
    }
}
