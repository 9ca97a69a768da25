use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::extraction::validation::{FieldType, ValidationRule};

/// Template store error types
#[derive(Error, Debug)]
pub enum TemplateError {
    /// No template registered under the requested name
    #[error("Template not found: {0}")]
    NotFound(String),
    /// Storage error
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// One field in a template's extraction catalog: the field name and the
/// regular expression used to find it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Field name produced on match
    pub name: String,
    /// Regular expression; the first capture group (or the whole match)
    /// becomes the field value
    pub pattern: String,
}

impl CatalogEntry {
    /// Create a catalog entry.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// A named configuration bundling a target field catalog and its validation
/// rules for one document type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Template name, matched against a job's processing type
    pub name: String,
    /// Field catalog applied by pattern extraction
    pub catalog: Vec<CatalogEntry>,
    /// Validation rules applied to the fused field set
    pub rules: Vec<ValidationRule>,
}

impl Template {
    /// Names of every field in the catalog.
    pub fn field_names(&self) -> Vec<String> {
        self.catalog.iter().map(|entry| entry.name.clone()).collect()
    }
}

/// Trait for template repositories.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Fetch the template registered under `name`.
    async fn get_template(&self, name: &str) -> Result<Template, TemplateError>;
}

/// In-memory implementation of TemplateStore, seeded with the nanopore
/// submission-form template.
pub struct InMemoryTemplateStore {
    templates: RwLock<HashMap<String, Template>>,
}

impl InMemoryTemplateStore {
    /// Create a store containing the default nanopore template.
    pub fn new() -> Self {
        let mut templates = HashMap::new();
        let nanopore = nanopore_submission_template();
        templates.insert(nanopore.name.clone(), nanopore);
        Self {
            templates: RwLock::new(templates),
        }
    }

    /// Register or replace a template.
    pub async fn insert(&self, template: Template) {
        let mut templates = self.templates.write().await;
        templates.insert(template.name.clone(), template);
    }
}

impl Default for InMemoryTemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn get_template(&self, name: &str) -> Result<Template, TemplateError> {
        let templates = self.templates.read().await;
        templates
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }
}

/// Field catalog for nanopore sequencing submission forms.
pub fn nanopore_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("sample_name", r"(?i)sample\s*name\s*:?\s*([A-Za-z0-9][A-Za-z0-9_.-]*)"),
        CatalogEntry::new("submitter_name", r"(?i)submitter\s*(?:name)?\s*:?\s*([A-Za-z][A-Za-z .'-]+)"),
        CatalogEntry::new(
            "submitter_email",
            r"(?i)e-?mail\s*:?\s*([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})",
        ),
        CatalogEntry::new("lab_name", r"(?i)lab(?:oratory)?\s*(?:name)?\s*:?\s*([A-Za-z0-9][A-Za-z0-9 .,&'-]+)"),
        CatalogEntry::new("sample_type", r"(?i)sample\s*type\s*:?\s*([A-Za-z][A-Za-z0-9 -]*)"),
        CatalogEntry::new("concentration", r"(?i)concentration\s*:?\s*(\d+(?:\.\d+)?)"),
        CatalogEntry::new("volume", r"(?i)volume\s*:?\s*(\d+(?:\.\d+)?)"),
        CatalogEntry::new("total_amount", r"(?i)total\s*amount\s*:?\s*(\d+(?:\.\d+)?)"),
        CatalogEntry::new("flow_cell_type", r"(?i)flow\s*cell\s*type\s*:?\s*([A-Za-z0-9.]+)"),
        CatalogEntry::new("flow_cell_count", r"(?i)flow\s*cell\s*count\s*:?\s*(\d+)"),
        CatalogEntry::new("priority", r"(?i)priority\s*:?\s*([A-Za-z]+)"),
        CatalogEntry::new("chart_field", r"(?i)(?:chart\s*field|account(?:ing)?\s*code)\s*:?\s*([A-Z0-9][A-Z0-9-]*)"),
    ]
}

/// Default validation rules for nanopore sequencing submission forms.
pub fn nanopore_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule {
            field_name: "sample_name".to_string(),
            required: true,
            field_type: FieldType::String,
            min_length: Some(2),
            max_length: Some(64),
            min_value: None,
            max_value: None,
            allowed_values: None,
            pattern: None,
        },
        ValidationRule {
            field_name: "submitter_email".to_string(),
            required: true,
            field_type: FieldType::Email,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            allowed_values: None,
            pattern: None,
        },
        ValidationRule {
            field_name: "concentration".to_string(),
            required: false,
            field_type: FieldType::Number,
            min_length: None,
            max_length: None,
            min_value: Some(0.0),
            max_value: Some(10_000.0),
            allowed_values: None,
            pattern: None,
        },
        ValidationRule {
            field_name: "volume".to_string(),
            required: false,
            field_type: FieldType::Number,
            min_length: None,
            max_length: None,
            min_value: Some(0.0),
            max_value: None,
            allowed_values: None,
            pattern: None,
        },
        ValidationRule {
            field_name: "flow_cell_count".to_string(),
            required: false,
            field_type: FieldType::Number,
            min_length: None,
            max_length: None,
            min_value: Some(1.0),
            max_value: Some(100.0),
            allowed_values: None,
            pattern: None,
        },
        ValidationRule {
            field_name: "priority".to_string(),
            required: false,
            field_type: FieldType::String,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            allowed_values: Some(vec![
                "low".to_string(),
                "normal".to_string(),
                "high".to_string(),
                "urgent".to_string(),
            ]),
            pattern: None,
        },
    ]
}

/// The seeded default template.
pub fn nanopore_submission_template() -> Template {
    Template {
        name: "nanopore_submission".to_string(),
        catalog: nanopore_catalog(),
        rules: nanopore_rules(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_seeds_nanopore_template() {
        let store = InMemoryTemplateStore::new();
        let template = store.get_template("nanopore_submission").await.unwrap();
        assert!(template.field_names().contains(&"sample_name".to_string()));
        assert!(!template.rules.is_empty());
    }

    #[tokio::test]
    async fn test_missing_template_errors() {
        let store = InMemoryTemplateStore::new();
        let err = store.get_template("unknown").await.unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_insert_replaces_template() {
        let store = InMemoryTemplateStore::new();
        let custom = Template {
            name: "custom".to_string(),
            catalog: vec![CatalogEntry::new("title", r"(?i)title\s*:?\s*(.+)")],
            rules: vec![],
        };
        store.insert(custom).await;
        let fetched = store.get_template("custom").await.unwrap();
        assert_eq!(fetched.catalog.len(), 1);
    }
}
