//! nanoform: structured data extraction from laboratory submission documents.
//!
//! The pipeline converts a submitted document (PDF or plain text) into
//! validated structured fields and an indexed, queryable record:
//!
//! 1. Text extraction from the document binary
//! 2. Pattern-based field extraction from a per-template catalog
//! 3. Language-model extraction of the fields patterns missed
//! 4. Confidence-weighted fusion of the two field sets
//! 5. Rule-based validation against the template's rules
//! 6. Embedding and vector indexing of the document
//!
//! Indexed documents can then be queried with retrieval-augmented
//! question answering via [`ExtractionPipeline::ask`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use nanoform::{Config, ExtractionPipeline, DocumentSubmission};
//! use nanoform::llm::{OllamaProvider, ProviderConfig};
//! use nanoform::embeddings::{EmbeddingConfig, OllamaEmbeddingProvider};
//! use nanoform::storage::vector::MemoryVectorStore;
//!
//! # async fn run() -> nanoform::Result<()> {
//! let config = Config::default();
//! let provider = Arc::new(OllamaProvider::new(ProviderConfig::default())?);
//! let embedder = Arc::new(OllamaEmbeddingProvider::new(EmbeddingConfig::default())?);
//! let store = Arc::new(MemoryVectorStore::new());
//! let pipeline = ExtractionPipeline::new(config, provider, embedder, store)?;
//!
//! let job = pipeline
//!     .submit(DocumentSubmission {
//!         bytes: b"Sample Name: TEST-01\nEmail: jane@lab.edu".to_vec(),
//!         file_name: "form.txt".to_string(),
//!         mime_type: "text/plain".to_string(),
//!         processing_type: "nanopore_submission".to_string(),
//!         sample_id: Some("S-1".to_string()),
//!         instruction: None,
//!     })
//!     .await?;
//! println!("job {} finished as {:?}", job.id, job.status);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod embeddings;
pub mod extraction;
pub mod indexer;
pub mod jobs;
pub mod llm;
pub mod rag;
pub mod storage;
pub mod types;
pub mod utils;

pub use extraction::{
    DocumentTextExtractor, ExtractedDocument, FieldType, InMemoryTemplateStore, PatternFieldExtractor,
    RuleValidator, Template, TemplateStore, ValidationRule,
};
pub use jobs::{ExtractionJob, FileMetadata, InMemoryJobStore, JobStatus, JobStore};
pub use rag::{RagAnswer, RetrievalAnswerer, RetrievalParams};
pub use types::{
    Config, ConfidenceLevel, Error, ExtractedField, ExtractionOutcome, FieldSource, Result,
};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::extraction::{fuse_fields, LanguageModelFieldExtractor, ModelExtractionConfig};
use crate::indexer::{DocumentIndexMetadata, EmbeddingIndexer};
use crate::llm::Provider;
use crate::storage::vector::VectorStore;
use crate::types::EmbeddingProvider;

/// A document handed to the pipeline for processing.
#[derive(Debug, Clone)]
pub struct DocumentSubmission {
    /// Raw document bytes (PDF or UTF-8 text)
    pub bytes: Vec<u8>,
    /// Original file name
    pub file_name: String,
    /// Declared MIME type
    pub mime_type: String,
    /// Template name selecting the catalog and rules, e.g. "nanopore_submission"
    pub processing_type: String,
    /// Optional caller-supplied sample identifier
    pub sample_id: Option<String>,
    /// Optional extra instruction passed to the model extractor
    pub instruction: Option<String>,
}

/// The end-to-end document extraction pipeline.
///
/// Holds the model provider, embedder, vector store, and job/template
/// stores behind trait objects, so every seam can be swapped in tests.
pub struct ExtractionPipeline {
    provider: Arc<dyn Provider>,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    job_store: Arc<dyn JobStore>,
    template_store: Arc<dyn TemplateStore>,
    config: Config,
    text_extractor: DocumentTextExtractor,
    validator: RuleValidator,
}

impl ExtractionPipeline {
    /// Build a pipeline with in-memory job and template stores.
    pub fn new(
        config: Config,
        provider: Arc<dyn Provider>,
        embedder: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        Ok(Self {
            provider,
            embedder,
            vector_store,
            job_store: Arc::new(InMemoryJobStore::new()),
            template_store: Arc::new(InMemoryTemplateStore::new()),
            config,
            text_extractor: DocumentTextExtractor::new(),
            validator: RuleValidator::new()?,
        })
    }

    /// Replace the job store.
    pub fn with_job_store(mut self, job_store: Arc<dyn JobStore>) -> Self {
        self.job_store = job_store;
        self
    }

    /// Replace the template store.
    pub fn with_template_store(mut self, template_store: Arc<dyn TemplateStore>) -> Self {
        self.template_store = template_store;
        self
    }

    /// Access to the job store, for status queries.
    pub fn job_store(&self) -> &Arc<dyn JobStore> {
        &self.job_store
    }

    /// Process a submitted document synchronously.
    ///
    /// A job record is created first, so a processing failure still returns
    /// `Ok` with a job in the `Failed` state carrying the error message.
    /// `Err` is reserved for failures of the job store itself.
    pub async fn submit(&self, submission: DocumentSubmission) -> Result<ExtractionJob> {
        let file = FileMetadata {
            file_name: submission.file_name.clone(),
            file_size: submission.bytes.len() as u64,
            mime_type: submission.mime_type.clone(),
        };
        let job = ExtractionJob::new(&submission.processing_type, file, submission.sample_id.clone());
        let job_id = job.id.clone();
        self.job_store.create(job).await?;
        self.job_store
            .update_status(&job_id, JobStatus::Processing, 10)
            .await?;
        info!(job_id = %job_id, file = %submission.file_name, "extraction job started");

        match self.run_pipeline(&job_id, &submission).await {
            Ok(outcome) => {
                let job = self.job_store.update_result(&job_id, outcome).await?;
                info!(job_id = %job_id, "extraction job completed");
                Ok(job)
            }
            Err(err) => {
                warn!(job_id = %job_id, error = %err, "extraction job failed");
                let job = self.job_store.set_error(&job_id, &err.to_string()).await?;
                Ok(job)
            }
        }
    }

    /// Fetch a job record by id.
    pub async fn get_job(&self, id: &str) -> Result<ExtractionJob> {
        Ok(self.job_store.get(id).await?)
    }

    /// Reprocess a previously submitted document.
    ///
    /// This never revives the old job record; a fresh job with a new id is
    /// created and the old one stays in its terminal state.
    pub async fn reprocess(&self, submission: DocumentSubmission) -> Result<ExtractionJob> {
        self.submit(submission).await
    }

    /// Answer a question over the indexed documents.
    pub async fn ask(
        &self,
        query: &str,
        extra_context: Option<&str>,
        params: &RetrievalParams,
    ) -> Result<RagAnswer> {
        let answerer = RetrievalAnswerer::new(
            Arc::clone(&self.provider),
            Arc::clone(&self.embedder),
            Arc::clone(&self.vector_store),
            self.config.collection.clone(),
            self.config.max_answer_tokens,
        );
        answerer.answer(query, extra_context, params).await
    }

    async fn run_pipeline(&self, job_id: &str, submission: &DocumentSubmission) -> Result<ExtractionOutcome> {
        let start = Instant::now();

        let template = self
            .template_store
            .get_template(&submission.processing_type)
            .await?;

        // 1. Text extraction
        let document = self.text_extractor.extract(&submission.bytes)?;
        if document.is_scanned {
            warn!(job_id, "document appears to be scanned; extraction quality may be low");
        }
        self.job_store
            .update_status(job_id, JobStatus::Processing, 30)
            .await?;

        // 2. Pattern extraction
        let pattern_extractor = PatternFieldExtractor::new(&template.catalog)?;
        let pattern_fields = pattern_extractor.extract(&document.text);
        self.job_store
            .update_status(job_id, JobStatus::Processing, 50)
            .await?;

        // 3. Model extraction, only for fields the patterns missed
        let found: HashSet<&str> = pattern_fields.iter().map(|f| f.field_name.as_str()).collect();
        let missing: Vec<String> = template
            .field_names()
            .into_iter()
            .filter(|name| !found.contains(name.as_str()))
            .collect();
        let model_fields = if missing.is_empty() {
            Vec::new()
        } else {
            let extractor = LanguageModelFieldExtractor::new(
                Arc::clone(&self.provider),
                ModelExtractionConfig {
                    max_tokens: self.config.max_extraction_tokens,
                    ..Default::default()
                },
            );
            extractor
                .extract(&document.text, &missing, submission.instruction.as_deref())
                .await?
        };
        self.job_store
            .update_status(job_id, JobStatus::Processing, 65)
            .await?;

        // 4. Fusion
        let fused = fuse_fields(pattern_fields, model_fields);
        self.job_store
            .update_status(job_id, JobStatus::Processing, 75)
            .await?;

        // 5. Validation
        let validation = self.validator.validate(&fused.fields, &template.rules)?;
        let mut fields = fused.fields;
        for field in &mut fields {
            if let Some(errors) = validation.field_errors.get(&field.field_name) {
                field.validation_errors = Some(errors.clone());
            }
        }
        self.job_store
            .update_status(job_id, JobStatus::Processing, 90)
            .await?;

        // 6. Embedding and indexing
        let indexer = EmbeddingIndexer::new(
            Arc::clone(&self.embedder),
            Arc::clone(&self.vector_store),
            self.config.collection.clone(),
            self.config.vector_dim,
        );
        let metadata = DocumentIndexMetadata {
            sample_id: submission.sample_id.clone(),
            file_name: submission.file_name.clone(),
            file_size: submission.bytes.len() as u64,
            mime_type: submission.mime_type.clone(),
            processing_type: submission.processing_type.clone(),
            page_count: document.page_count as usize,
        };
        indexer.index_document(&document.text, &fields, &metadata).await?;

        // Validation findings never fail the job; errors surface ahead of
        // the soft warnings in the job-level list.
        let mut warnings = validation.errors;
        warnings.extend(validation.warnings);
        Ok(ExtractionOutcome {
            extracted_fields: fields,
            confidence: fused.confidence,
            confidence_level: fused.confidence_level,
            processing_time_ms: start.elapsed().as_millis() as u64,
            pages_processed: document.page_count,
            validation_score: validation.score,
            suggestions: validation.suggestions,
            warnings,
        })
    }
}
