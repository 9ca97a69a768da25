//! Extracted-field data types shared by every extraction strategy.

use serde::{Deserialize, Serialize};

/// Categorical summary of a numeric confidence score.
///
/// The banding is deterministic and is the only way a level may be produced:
/// ≥0.9 very high, ≥0.7 high, ≥0.5 medium, below that low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Confidence below 0.5
    Low,
    /// Confidence in [0.5, 0.7)
    Medium,
    /// Confidence in [0.7, 0.9)
    High,
    /// Confidence of 0.9 and above
    VeryHigh,
}

impl ConfidenceLevel {
    /// Derive the level from a numeric score. Scores outside [0, 1] are
    /// clamped before banding.
    pub fn from_score(score: f32) -> Self {
        let score = score.clamp(0.0, 1.0);
        if score >= 0.9 {
            ConfidenceLevel::VeryHigh
        } else if score >= 0.7 {
            ConfidenceLevel::High
        } else if score >= 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// Which extraction strategy produced a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Deterministic regular-expression match
    Pattern,
    /// Language-model inference
    LanguageModel,
}

/// Rectangular region on a page, in page-relative units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Region width
    pub width: f32,
    /// Region height
    pub height: f32,
}

/// A single field extracted from a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedField {
    /// Field name, unique per job after fusion
    pub field_name: String,
    /// Extracted value, whitespace-trimmed
    pub value: String,
    /// Confidence score in [0.0, 1.0]
    pub confidence: f32,
    /// Categorical band derived from `confidence`
    pub confidence_level: ConfidenceLevel,
    /// Strategy that produced the field
    pub source: FieldSource,
    /// Estimated page number (1-based). Derived by uniform line division, so
    /// this is approximate, not a layout-aware position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Region the value was found in, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Validation findings attached after rule evaluation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<String>>,
}

impl ExtractedField {
    /// Create a field with a clamped confidence and its derived level.
    pub fn new(field_name: impl Into<String>, value: impl Into<String>, confidence: f32, source: FieldSource) -> Self {
        let confidence = confidence.clamp(0.0, 1.0);
        Self {
            field_name: field_name.into(),
            value: value.into(),
            confidence,
            confidence_level: ConfidenceLevel::from_score(confidence),
            source,
            page_number: None,
            bounding_box: None,
            validation_errors: None,
        }
    }

    /// Attach an estimated page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page_number = Some(page);
        self
    }
}

/// Final result assembled for a completed extraction job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Fused fields, one per distinct field name
    pub extracted_fields: Vec<ExtractedField>,
    /// Mean confidence of the fused fields, 0.0 when none were found
    pub confidence: f32,
    /// Banded form of `confidence`
    pub confidence_level: ConfidenceLevel,
    /// Wall-clock processing time
    pub processing_time_ms: u64,
    /// Pages reported by the text extractor
    pub pages_processed: u32,
    /// Fraction of validation rules satisfied without error
    pub validation_score: f32,
    /// Advisory suggestions from validation
    pub suggestions: Vec<String>,
    /// Non-fatal validation warnings
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_banding() {
        assert_eq!(ConfidenceLevel::from_score(0.95), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::from_score(0.9), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::from_score(0.89), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.7), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.69), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.5), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.49), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.0), ConfidenceLevel::Low);
    }

    #[test]
    fn test_banding_clamps_out_of_range_scores() {
        assert_eq!(ConfidenceLevel::from_score(1.7), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::from_score(-0.3), ConfidenceLevel::Low);
    }

    #[test]
    fn test_field_constructor_clamps_and_bands() {
        let field = ExtractedField::new("sample_name", "X-1", 1.4, FieldSource::Pattern);
        assert_eq!(field.confidence, 1.0);
        assert_eq!(field.confidence_level, ConfidenceLevel::VeryHigh);

        let field = ExtractedField::new("notes", "n/a", -0.2, FieldSource::LanguageModel);
        assert_eq!(field.confidence, 0.0);
        assert_eq!(field.confidence_level, ConfidenceLevel::Low);
    }
}
