use std::collections::HashMap;

use tracing::debug;

use crate::types::{ConfidenceLevel, ExtractedField};

/// Result of merging the two extraction strategies for one job.
#[derive(Debug, Clone)]
pub struct FusedFields {
    /// One field per distinct field name
    pub fields: Vec<ExtractedField>,
    /// Arithmetic mean of the fused fields' confidence, 0.0 when empty
    pub confidence: f32,
    /// Banded form of the job confidence
    pub confidence_level: ConfidenceLevel,
}

/// Merge pattern- and model-extracted fields by field name.
///
/// Pattern fields seed the result; a model field replaces its namesake only
/// when its confidence is strictly greater. Ties keep the pattern result,
/// since the deterministic strategy was inserted first and an equal-scoring
/// competitor is not allowed to overwrite it. Output order is pattern order,
/// then model-only fields in model order, so fusion is deterministic.
pub fn fuse_fields(pattern_fields: Vec<ExtractedField>, model_fields: Vec<ExtractedField>) -> FusedFields {
    let mut fields: Vec<ExtractedField> = Vec::with_capacity(pattern_fields.len() + model_fields.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for field in pattern_fields {
        index.insert(field.field_name.clone(), fields.len());
        fields.push(field);
    }

    for field in model_fields {
        match index.get(&field.field_name) {
            Some(&slot) => {
                if field.confidence > fields[slot].confidence {
                    fields[slot] = field;
                }
            }
            None => {
                index.insert(field.field_name.clone(), fields.len());
                fields.push(field);
            }
        }
    }

    let confidence = if fields.is_empty() {
        0.0
    } else {
        fields.iter().map(|f| f.confidence).sum::<f32>() / fields.len() as f32
    };

    debug!(fused = fields.len(), confidence, "field fusion finished");

    FusedFields {
        confidence_level: ConfidenceLevel::from_score(confidence),
        confidence,
        fields,
    }
}
