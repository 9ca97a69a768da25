//! End-to-end pipeline tests over mocked model and embedding providers.

mod common;

use std::sync::Arc;

use common::{MockEmbeddingProvider, MockProvider};
use nanoform::storage::vector::MemoryVectorStore;
use nanoform::{Config, DocumentSubmission, ExtractionPipeline, FieldSource, JobStatus};

const DIM: usize = 8;

fn test_config() -> Config {
    Config {
        vector_dim: DIM,
        ..Default::default()
    }
}

fn pipeline_with(provider: MockProvider) -> ExtractionPipeline {
    common::init_tracing();
    ExtractionPipeline::new(
        test_config(),
        Arc::new(provider),
        Arc::new(MockEmbeddingProvider::new(DIM)),
        Arc::new(MemoryVectorStore::new()),
    )
    .unwrap()
}

fn submission(text: &str) -> DocumentSubmission {
    DocumentSubmission {
        bytes: text.as_bytes().to_vec(),
        file_name: "form.txt".to_string(),
        mime_type: "text/plain".to_string(),
        processing_type: "nanopore_submission".to_string(),
        sample_id: Some("S-100".to_string()),
        instruction: None,
    }
}

const COMPLETE_FORM: &str = "Sample Name: TEST-01\n\
Submitter: Jane Doe\n\
Email: jane@example.edu\n\
Concentration: 42.5\n\
Volume: 30\n\
Flow Cell Count: 2\n\
Priority: normal\n";

#[tokio::test]
async fn test_complete_form_yields_completed_job() {
    let pipeline = pipeline_with(MockProvider::new(vec!["{}"]));
    let job = pipeline.submit(submission(COMPLETE_FORM)).await.unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);
    assert!(job.started_at.is_some());
    assert!(job.completed_at.is_some());
    assert!(job.error.is_none());

    let result = job.result.unwrap();
    assert_eq!(result.pages_processed, 1);
    assert!(result.confidence > 0.5);
    assert!((result.validation_score - 1.0).abs() < 1e-6);
    assert!(result.suggestions.is_empty());

    let names: Vec<&str> = result
        .extracted_fields
        .iter()
        .map(|f| f.field_name.as_str())
        .collect();
    assert!(names.contains(&"sample_name"));
    assert!(names.contains(&"submitter_email"));
    assert!(names.contains(&"concentration"));

    let sample = result
        .extracted_fields
        .iter()
        .find(|f| f.field_name == "sample_name")
        .unwrap();
    assert_eq!(sample.value, "TEST-01");
    assert_eq!(sample.source, FieldSource::Pattern);
    assert!(sample.validation_errors.is_none());
}

#[tokio::test]
async fn test_model_fills_fields_patterns_missed() {
    // The email is malformed, so the pattern cannot pick it up; the model is
    // asked for it and answers with the same bad address, which validation
    // then flags.
    let doc = "Sample Name: TEST-01\nEmail: jane(at)lab(dot)edu\n";
    let provider = MockProvider::new(vec![
        r#"{"submitter_email": "jane(at)lab(dot)edu", "lab_name": "Genomics Core", "sample_type": null}"#,
    ]);
    let pipeline = pipeline_with(provider);
    let job = pipeline.submit(submission(doc)).await.unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    let result = job.result.unwrap();

    let email = result
        .extracted_fields
        .iter()
        .find(|f| f.field_name == "submitter_email")
        .unwrap();
    assert_eq!(email.source, FieldSource::LanguageModel);
    let email_errors = email.validation_errors.as_ref().unwrap();
    assert!(email_errors[0].contains("email"));

    let lab = result
        .extracted_fields
        .iter()
        .find(|f| f.field_name == "lab_name")
        .unwrap();
    assert_eq!(lab.value, "Genomics Core");

    assert!(result.validation_score < 1.0);
    assert!(!result.suggestions.is_empty());
    assert!(result.warnings.iter().any(|w| w.contains("submitter_email")));
}

#[tokio::test]
async fn test_pattern_field_survives_model_disagreement() {
    // The model is scripted to claim a different sample name; the pattern
    // match has higher confidence and must win the fusion.
    let doc = "Sample Name: TEST-01\nEmail: bad\n";
    let provider = MockProvider::new(vec![r#"{"sample_name": "WRONG", "submitter_email": null}"#]);
    let pipeline = pipeline_with(provider);
    let job = pipeline.submit(submission(doc)).await.unwrap();

    let result = job.result.unwrap();
    let sample = result
        .extracted_fields
        .iter()
        .find(|f| f.field_name == "sample_name")
        .unwrap();
    assert_eq!(sample.value, "TEST-01");
    assert_eq!(sample.source, FieldSource::Pattern);
}

#[tokio::test]
async fn test_model_asked_only_for_missing_fields() {
    let provider = Arc::new(MockProvider::new(vec!["{}"]));
    let pipeline = ExtractionPipeline::new(
        test_config(),
        Arc::clone(&provider) as Arc<dyn nanoform::llm::Provider>,
        Arc::new(MockEmbeddingProvider::new(DIM)),
        Arc::new(MemoryVectorStore::new()),
    )
    .unwrap();
    let job = pipeline.submit(submission(COMPLETE_FORM)).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);

    // One extraction call, and its prompt lists only fields the patterns
    // could not find in the form.
    assert_eq!(provider.call_count(), 1);
    let prompts = provider.prompts.lock().unwrap();
    assert!(prompts[0].contains("lab_name"));
    assert!(prompts[0].contains("chart_field"));
    assert!(!prompts[0].contains("- sample_name"));
    assert!(!prompts[0].contains("- submitter_email"));
}

#[tokio::test]
async fn test_provider_failure_fails_job_not_submit() {
    let doc = "Sample Name: TEST-01\n";
    let pipeline = pipeline_with(MockProvider::failing());
    let job = pipeline.submit(submission(doc)).await.unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.result.is_none());
    let error = job.error.unwrap();
    assert!(error.contains("mock provider down"));
    assert!(job.completed_at.is_some());
}

#[tokio::test]
async fn test_empty_document_fails_job() {
    let pipeline = pipeline_with(MockProvider::new(vec![]));
    let job = pipeline.submit(submission("   \n  ")).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.is_some());
}

#[tokio::test]
async fn test_unknown_processing_type_fails_job() {
    let pipeline = pipeline_with(MockProvider::new(vec![]));
    let mut sub = submission(COMPLETE_FORM);
    sub.processing_type = "unknown_template".to_string();
    let job = pipeline.submit(sub).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().contains("unknown_template"));
}

#[tokio::test]
async fn test_reprocessing_creates_fresh_job() {
    let pipeline = pipeline_with(MockProvider::new(vec!["{}", "{}"]));
    let first = pipeline.submit(submission(COMPLETE_FORM)).await.unwrap();
    let second = pipeline.reprocess(submission(COMPLETE_FORM)).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(second.status, JobStatus::Completed);

    // The original record keeps its terminal state.
    let original = pipeline.get_job(&first.id).await.unwrap();
    assert_eq!(original.status, JobStatus::Completed);

    let by_type = pipeline
        .job_store()
        .get_by_type("nanopore_submission")
        .await
        .unwrap();
    assert_eq!(by_type.len(), 2);
}

#[tokio::test]
async fn test_job_record_carries_file_metadata() {
    let pipeline = pipeline_with(MockProvider::new(vec!["{}"]));
    let job = pipeline.submit(submission(COMPLETE_FORM)).await.unwrap();

    assert_eq!(job.file.file_name, "form.txt");
    assert_eq!(job.file.file_size, COMPLETE_FORM.len() as u64);
    assert_eq!(job.file.mime_type, "text/plain");
    assert_eq!(job.sample_id.as_deref(), Some("S-100"));
}
