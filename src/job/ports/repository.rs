//! Repository port for job persistence with optimistic concurrency.

use crate::job::domain::{Job, JobId, JobNumber, JobVersion, NoteId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Result type for job repository operations.
pub type JobRepositoryResult<T> = Result<T, JobRepositoryError>;

/// Job persistence contract.
///
/// Implementations maintain a `note_id -> job_id` index that is updated
/// atomically with every job write, so notes can be resolved to their owning
/// job without scanning.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Stores a new job and returns the version it was stored at.
    ///
    /// # Errors
    ///
    /// Returns [`JobRepositoryError::DuplicateJob`] when the job ID already
    /// exists or [`JobRepositoryError::DuplicateJobNumber`] when another job
    /// holds the same job number.
    async fn store(&self, job: &Job) -> JobRepositoryResult<JobVersion>;

    /// Writes the whole job if the stored version still equals
    /// [`Job::version`], returning the new version.
    ///
    /// # Errors
    ///
    /// Returns [`JobRepositoryError::NotFound`] when the job does not exist or
    /// [`JobRepositoryError::VersionConflict`] when another writer got there
    /// first.
    async fn update(&self, job: &Job) -> JobRepositoryResult<JobVersion>;

    /// Finds a job by identifier.
    async fn find_by_id(&self, id: JobId) -> JobRepositoryResult<Option<Job>>;

    /// Returns every non-archived job, most recently created first.
    async fn list_active(&self) -> JobRepositoryResult<Vec<Job>>;

    /// Finds the job whose ledgers contain `note_id`.
    async fn find_by_note_id(&self, note_id: NoteId) -> JobRepositoryResult<Option<Job>>;

    /// Counts jobs created on the given UTC calendar day.
    async fn count_created_on(&self, day: NaiveDate) -> JobRepositoryResult<u32>;
}

/// Errors returned by job repository implementations.
#[derive(Debug, Clone, Error)]
pub enum JobRepositoryError {
    /// A job with the same identifier already exists.
    #[error("duplicate job identifier: {0}")]
    DuplicateJob(JobId),

    /// Another job already holds this job number.
    #[error("duplicate job number: {0}")]
    DuplicateJobNumber(JobNumber),

    /// The job was not found.
    #[error("job not found: {0}")]
    NotFound(JobId),

    /// The stored version moved on since the job was read.
    #[error("job {job_id} was modified concurrently (expected {expected})")]
    VersionConflict {
        /// Job being written.
        job_id: JobId,
        /// Version the writer read.
        expected: JobVersion,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl JobRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for failures a caller may retry, re-reading state first.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::VersionConflict { .. } | Self::DuplicateJobNumber(_) | Self::Persistence(_)
        )
    }
}

impl From<diesel::result::Error> for JobRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
