//! Document-to-structured-data extraction components.
//!
//! The pipeline runs two independent extraction strategies over the same
//! document text: a deterministic regular-expression catalog and a
//! language-model pass restricted to whatever the catalog missed. Both
//! produce `ExtractedField` lists, which fusion merges by confidence before
//! rule validation.

/// Document text extraction from raw bytes.
pub mod document;

/// Regular-expression field extraction.
pub mod patterns;

/// Language-model field extraction.
pub mod model;

/// Confidence-weighted merge of the two strategies.
pub mod fusion;

/// Rule-based validation of fused fields.
pub mod validation;

/// Named templates bundling a field catalog with its validation rules.
pub mod templates;

pub use document::{DocumentTextExtractor, ExtractedDocument};
pub use fusion::{fuse_fields, FusedFields};
pub use model::{LanguageModelFieldExtractor, ModelExtractionConfig};
pub use patterns::{extract_nanopore_form_fields, PatternFieldExtractor, LINES_PER_PAGE};
pub use templates::{CatalogEntry, InMemoryTemplateStore, Template, TemplateError, TemplateStore};
pub use validation::{FieldType, RuleValidationResult, RuleValidator, ValidationRule};
