use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::llm::{LLMParams, Provider};
use crate::types::{ExtractedField, FieldSource, Result};

/// Configuration for language-model field extraction.
#[derive(Debug, Clone)]
pub struct ModelExtractionConfig {
    /// Sampling temperature; kept low so the model sticks to the document
    pub temperature: f32,
    /// Output-token budget
    pub max_tokens: usize,
}

impl Default for ModelExtractionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 1000,
        }
    }
}

/// Prompts a text-generation service to extract fields the pattern catalog
/// missed.
///
/// The model is asked for a flat JSON object; when the response is not valid
/// JSON the parser falls back to line-based `key: value` extraction, so a
/// malformed response degrades quietly instead of failing the job. Transport
/// errors are fatal for the step and are never retried.
pub struct LanguageModelFieldExtractor {
    provider: Arc<dyn Provider>,
    config: ModelExtractionConfig,
}

impl LanguageModelFieldExtractor {
    /// Create an extractor over the given provider.
    pub fn new(provider: Arc<dyn Provider>, config: ModelExtractionConfig) -> Self {
        Self { provider, config }
    }

    /// Extract the target fields from the document text.
    ///
    /// `instruction` is an optional caller-supplied hint prepended to the
    /// prompt.
    pub async fn extract(
        &self,
        text: &str,
        target_fields: &[String],
        instruction: Option<&str>,
    ) -> Result<Vec<ExtractedField>> {
        if target_fields.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_extraction_prompt(text, target_fields, instruction);
        let params = LLMParams {
            model: self.provider.get_config().model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            ..Default::default()
        };

        debug!(targets = target_fields.len(), "requesting model extraction");
        let response = self.provider.complete(&prompt, &params).await?;

        Ok(parse_model_fields(&response.text))
    }
}

/// Build the extraction prompt: target field list, JSON-shape instruction,
/// and the raw document text.
pub(crate) fn build_extraction_prompt(text: &str, target_fields: &[String], instruction: Option<&str>) -> String {
    let mut prompt = String::new();
    if let Some(extra) = instruction {
        prompt.push_str(extra);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Extract the following fields from the document below:\n");
    for name in target_fields {
        prompt.push_str("- ");
        prompt.push_str(name);
        prompt.push('\n');
    }
    prompt.push_str(
        "\nReturn a single flat JSON object whose keys are exactly the field names above. \
         Use null for any field not present in the document. Do not add commentary.\n\nDocument:\n",
    );
    prompt.push_str(text);
    prompt
}

/// Parse model output into fields.
///
/// First attempt: find the outermost `{...}` substring and parse it as JSON.
/// Fallback: treat each `key: value` line as a field, normalizing the key to
/// lowercase with underscores.
pub fn parse_model_fields(text: &str) -> Vec<ExtractedField> {
    if let Some(parsed) = parse_json_object(text) {
        return fields_from_map(parsed);
    }
    warn!("model response was not valid JSON, falling back to line parsing");
    parse_line_fields(text)
}

fn parse_json_object(text: &str) -> Option<HashMap<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn fields_from_map(map: HashMap<String, Value>) -> Vec<ExtractedField> {
    let mut fields = Vec::new();
    for (key, value) in map {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s,
            other => other.to_string(),
        };
        let value = value.trim().to_string();
        if value.is_empty() {
            continue;
        }
        let confidence = score_model_field(&key, &value);
        fields.push(ExtractedField::new(key, value, confidence, FieldSource::LanguageModel));
    }
    fields.sort_by(|a, b| a.field_name.cmp(&b.field_name));
    fields
}

fn parse_line_fields(text: &str) -> Vec<ExtractedField> {
    let mut fields = Vec::new();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_start_matches('-').trim().to_lowercase().replace(' ', "_");
        let value = value.trim().trim_matches('"').trim_end_matches(',').trim_matches('"').trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        if value.eq_ignore_ascii_case("null") || value.eq_ignore_ascii_case("undefined") {
            continue;
        }
        let confidence = score_model_field(&key, value);
        fields.push(ExtractedField::new(key, value, confidence, FieldSource::LanguageModel));
    }
    fields
}

/// Confidence heuristic for a model-extracted value. Independent from the
/// pattern-extraction formula, same 1.0 cap.
fn score_model_field(field_name: &str, value: &str) -> f32 {
    let mut score: f32 = 0.5;
    if value.len() > 2 {
        score += 0.2;
    }
    if field_name.contains("email") && value.contains('@') {
        score += 0.3;
    }
    if (field_name.contains("name") || field_name.contains("lab")) && value.len() > 2 {
        score += 0.2;
    }
    if (field_name.contains("id") || field_name.contains("code")) && is_upper_alnum_code(value) {
        score += 0.3;
    }
    score.min(1.0)
}

/// Uppercase alphanumeric identifier, optionally with dashes.
fn is_upper_alnum_code(value: &str) -> bool {
    !value.is_empty()
        && value.chars().next().is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response_parsing() {
        let response = r#"Here are the fields:
{"submitter_name": "Jane Doe", "lab_name": null, "priority": "high"}"#;
        let fields = parse_model_fields(response);
        assert_eq!(fields.len(), 2);
        assert!(fields.iter().any(|f| f.field_name == "submitter_name" && f.value == "Jane Doe"));
        assert!(fields.iter().any(|f| f.field_name == "priority" && f.value == "high"));
        assert!(fields.iter().all(|f| f.source == FieldSource::LanguageModel));
    }

    #[test]
    fn test_line_fallback_parsing() {
        let response = "submitter name: Jane Doe\nLab Name: Genomics Core\npriority: null\nno separator line";
        let fields = parse_model_fields(response);
        assert_eq!(fields.len(), 2);
        assert!(fields.iter().any(|f| f.field_name == "submitter_name"));
        assert!(fields.iter().any(|f| f.field_name == "lab_name" && f.value == "Genomics Core"));
    }

    #[test]
    fn test_empty_and_null_values_skipped() {
        let response = r#"{"a": "", "b": null, "c": "value"}"#;
        let fields = parse_model_fields(response);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_name, "c");
    }

    #[test]
    fn test_model_confidence_heuristic() {
        // email name + '@' + length: 0.5 + 0.2 + 0.3 = 1.0
        assert!((score_model_field("submitter_email", "a@b.com") - 1.0).abs() < 1e-6);
        // name-ish field: 0.5 + 0.2 + 0.2 = 0.9
        assert!((score_model_field("lab_name", "Genomics Core") - 0.9).abs() < 1e-6);
        // id-ish field with code shape: 0.5 + 0.2 + 0.3 = 1.0
        assert!((score_model_field("sample_id", "NB-42") - 1.0).abs() < 1e-6);
        // short plain value: base only
        assert!((score_model_field("priority", "hi") - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_prompt_lists_targets() {
        let prompt = build_extraction_prompt("doc text", &["a".to_string(), "b".to_string()], Some("hint"));
        assert!(prompt.starts_with("hint"));
        assert!(prompt.contains("- a\n"));
        assert!(prompt.contains("- b\n"));
        assert!(prompt.contains("doc text"));
        assert!(prompt.contains("null"));
    }
}
