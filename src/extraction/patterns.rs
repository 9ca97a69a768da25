use regex::Regex;
use tracing::debug;

use crate::extraction::templates::{nanopore_catalog, CatalogEntry};
use crate::types::{Error, ExtractedField, FieldSource, Result};

/// Fixed lines-per-page constant used for approximate page attribution.
pub const LINES_PER_PAGE: usize = 50;

/// One compiled catalog entry.
struct FieldPattern {
    name: String,
    source: String,
    pattern: Regex,
}

/// Applies a catalog of named regular expressions to extracted text.
///
/// Confidence is a deterministic, explainable heuristic rather than a learned
/// score: it starts at 0.5 and earns bonuses for value length, email-shaped
/// patterns, numeric values, and short identifier codes, capped at 1.0.
pub struct PatternFieldExtractor {
    patterns: Vec<FieldPattern>,
}

impl PatternFieldExtractor {
    /// Compile an extractor from a template catalog.
    pub fn new(catalog: &[CatalogEntry]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(catalog.len());
        for entry in catalog {
            let pattern = Regex::new(&entry.pattern)
                .map_err(|e| Error::Config(format!("invalid pattern for field {}: {}", entry.name, e)))?;
            patterns.push(FieldPattern {
                name: entry.name.clone(),
                source: entry.pattern.clone(),
                pattern,
            });
        }
        Ok(Self { patterns })
    }

    /// Extractor over the default nanopore submission-form catalog.
    pub fn from_default_catalog() -> Result<Self> {
        Self::new(&nanopore_catalog())
    }

    /// Names of all fields this extractor can produce.
    pub fn field_names(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.name.clone()).collect()
    }

    /// Run every catalog pattern against the full text.
    pub fn extract(&self, text: &str) -> Vec<ExtractedField> {
        let mut fields = Vec::new();

        for entry in &self.patterns {
            let Some(captures) = entry.pattern.captures(text) else {
                continue;
            };
            let raw = captures
                .get(1)
                .or_else(|| captures.get(0))
                .map(|m| m.as_str())
                .unwrap_or_default();
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }

            let confidence = score_pattern_field(&entry.source, value);
            let mut field = ExtractedField::new(entry.name.clone(), value, confidence, FieldSource::Pattern);
            if let Some(page) = estimate_page(text, value) {
                field = field.with_page(page);
            }
            fields.push(field);
        }

        debug!(found = fields.len(), "pattern extraction finished");
        fields
    }
}

/// Confidence heuristic for a pattern-extracted value.
fn score_pattern_field(pattern_source: &str, value: &str) -> f32 {
    let mut score: f32 = 0.5;
    if value.len() > 3 {
        score += 0.2;
    }
    // Email-shaped catalog patterns carry an '@' in their source
    if pattern_source.contains('@') {
        score += 0.3;
    }
    if is_numeric(value) {
        score += 0.2;
    }
    if is_short_code(value) {
        score += 0.3;
    }
    score.min(1.0)
}

/// Whole value is digits with at most a decimal point.
fn is_numeric(value: &str) -> bool {
    !value.is_empty()
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Short identifier code: uppercase letters, an optional hyphen, then digits
/// (e.g. "X-1", "NB24").
fn is_short_code(value: &str) -> bool {
    let rest = value.trim_start_matches(|c: char| c.is_ascii_uppercase());
    if rest.len() == value.len() {
        return false;
    }
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Estimate the page a value appears on by scanning for the first line that
/// contains it and dividing the line index by `LINES_PER_PAGE`. Approximate
/// by construction.
fn estimate_page(text: &str, value: &str) -> Option<u32> {
    text.lines()
        .position(|line| line.contains(value))
        .map(|idx| (idx / LINES_PER_PAGE) as u32 + 1)
}

/// Apply the default nanopore submission-form catalog to a text.
pub fn extract_nanopore_form_fields(text: &str) -> Result<Vec<ExtractedField>> {
    Ok(PatternFieldExtractor::from_default_catalog()?.extract(text))
}
