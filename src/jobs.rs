//! Extraction job records and their lifecycle.
//!
//! Jobs move through a small state machine: `Pending` to `Processing`,
//! then to a terminal `Completed` or `Failed`. Terminal states never
//! transition again; reprocessing a document creates a fresh job with
//! a new id instead of reviving the old record.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::ExtractionOutcome;

/// Job lifecycle errors.
#[derive(Error, Debug)]
pub enum JobError {
    /// Attempted a transition the state machine forbids
    #[error("Invalid job transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current status
        from: JobStatus,
        /// Requested status
        to: JobStatus,
    },
    /// No job with the given id
    #[error("Job not found: {0}")]
    NotFound(String),
    /// The backing store failed
    #[error("Job storage error: {0}")]
    StorageError(String),
}

/// Lifecycle state of an extraction job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, not yet picked up
    Pending,
    /// Pipeline is running
    Processing,
    /// Finished with a result
    Completed,
    /// Finished with an error
    Failed,
}

impl JobStatus {
    /// Whether a transition to `next` is allowed.
    ///
    /// Processing→Processing is permitted so that progress milestones can be
    /// posted while a job runs.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }

    /// Completed and Failed are terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Descriptive metadata about the submitted file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Original file name
    pub file_name: String,
    /// Size in bytes
    pub file_size: u64,
    /// Declared MIME type
    pub mime_type: String,
}

/// One document extraction job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionJob {
    /// Unique job id
    pub id: String,
    /// Current status
    pub status: JobStatus,
    /// Coarse progress percentage, 0..=100
    pub progress: u8,
    /// Named processing flavour, e.g. "nanopore_submission"
    pub processing_type: String,
    /// Submitted file details
    pub file: FileMetadata,
    /// Optional caller-supplied sample identifier
    pub sample_id: Option<String>,
    /// Result once completed
    pub result: Option<ExtractionOutcome>,
    /// Error message once failed
    pub error: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// When processing started
    pub started_at: Option<DateTime<Utc>>,
    /// When a terminal state was reached
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExtractionJob {
    /// Create a new pending job with a random id.
    pub fn new(processing_type: impl Into<String>, file: FileMetadata, sample_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: JobStatus::Pending,
            progress: 0,
            processing_type: processing_type.into(),
            file,
            sample_id,
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Apply a status transition, stamping the relevant timestamps.
    pub fn update_status(&mut self, next: JobStatus, progress: u8) -> Result<(), JobError> {
        if !self.status.can_transition_to(next) {
            return Err(JobError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.progress = progress.min(100);
        match next {
            // Stamped once; progress-only re-posts keep the original time.
            JobStatus::Processing => {
                if self.started_at.is_none() {
                    self.started_at = Some(Utc::now());
                }
            }
            JobStatus::Completed | JobStatus::Failed => self.completed_at = Some(Utc::now()),
            JobStatus::Pending => {}
        }
        Ok(())
    }
}

/// Persistence seam for job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job.
    async fn create(&self, job: ExtractionJob) -> Result<(), JobError>;

    /// Fetch a job by id.
    async fn get(&self, id: &str) -> Result<ExtractionJob, JobError>;

    /// Transition a job's status, returning the updated record.
    async fn update_status(&self, id: &str, status: JobStatus, progress: u8) -> Result<ExtractionJob, JobError>;

    /// Attach a result and mark the job completed.
    async fn update_result(&self, id: &str, result: ExtractionOutcome) -> Result<ExtractionJob, JobError>;

    /// Attach an error message and mark the job failed.
    async fn set_error(&self, id: &str, message: &str) -> Result<ExtractionJob, JobError>;

    /// All jobs currently in a given status.
    async fn get_by_status(&self, status: JobStatus) -> Result<Vec<ExtractionJob>, JobError>;

    /// All jobs of a given processing type.
    async fn get_by_type(&self, processing_type: &str) -> Result<Vec<ExtractionJob>, JobError>;
}

/// In-memory job store backed by an async map.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, ExtractionJob>>,
}

impl InMemoryJobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: ExtractionJob) -> Result<(), JobError> {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.id.clone(), job);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<ExtractionJob, JobError> {
        let jobs = self.jobs.read().await;
        jobs.get(id).cloned().ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    async fn update_status(&self, id: &str, status: JobStatus, progress: u8) -> Result<ExtractionJob, JobError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(id).ok_or_else(|| JobError::NotFound(id.to_string()))?;
        job.update_status(status, progress)?;
        Ok(job.clone())
    }

    async fn update_result(&self, id: &str, result: ExtractionOutcome) -> Result<ExtractionJob, JobError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(id).ok_or_else(|| JobError::NotFound(id.to_string()))?;
        job.update_status(JobStatus::Completed, 100)?;
        job.result = Some(result);
        Ok(job.clone())
    }

    async fn set_error(&self, id: &str, message: &str) -> Result<ExtractionJob, JobError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(id).ok_or_else(|| JobError::NotFound(id.to_string()))?;
        job.update_status(JobStatus::Failed, job.progress)?;
        job.error = Some(message.to_string());
        Ok(job.clone())
    }

    async fn get_by_status(&self, status: JobStatus) -> Result<Vec<ExtractionJob>, JobError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.values().filter(|j| j.status == status).cloned().collect())
    }

    async fn get_by_type(&self, processing_type: &str) -> Result<Vec<ExtractionJob>, JobError> {
        let jobs = self.jobs.read().await;
        Ok(jobs
            .values()
            .filter(|j| j.processing_type == processing_type)
            .cloned()
            .collect())
    }
}
