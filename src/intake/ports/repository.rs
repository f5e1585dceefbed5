//! Repository ports for submissions and material checklist entries.

use crate::intake::domain::{MaterialEntry, MaterialId, Submission, SubmissionFilter, SubmissionId};
use crate::job::domain::JobId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for intake repository operations.
pub type IntakeRepositoryResult<T> = Result<T, IntakeRepositoryError>;

/// Submission persistence contract.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Inserts or replaces the record keyed by its submission ID.
    ///
    /// An existing job link is never replaced or cleared.
    async fn upsert(&self, submission: &Submission) -> IntakeRepositoryResult<()>;

    /// Finds a submission by provider identifier.
    async fn find_by_id(&self, id: &SubmissionId) -> IntakeRepositoryResult<Option<Submission>>;

    /// Lists submissions passing `filter`, oldest submission first.
    async fn list(&self, filter: SubmissionFilter) -> IntakeRepositoryResult<Vec<Submission>>;

    /// Writes back an existing submission.
    ///
    /// An existing job link is never replaced or cleared.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeRepositoryError::SubmissionNotFound`] when the record
    /// does not exist.
    async fn update(&self, submission: &Submission) -> IntakeRepositoryResult<()>;
}

/// Material checklist persistence contract.
#[async_trait]
pub trait MaterialRepository: Send + Sync {
    /// Inserts a new entry and returns its identifier.
    async fn insert(&self, entry: &MaterialEntry) -> IntakeRepositoryResult<MaterialId>;

    /// Points every unlinked entry of `submission_id` at `job_id`, returning
    /// how many entries were linked.
    async fn link_to_job(
        &self,
        submission_id: &SubmissionId,
        job_id: JobId,
    ) -> IntakeRepositoryResult<usize>;

    /// Returns the entries created for `submission_id`.
    async fn find_by_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> IntakeRepositoryResult<Vec<MaterialEntry>>;
}

/// Errors returned by intake repository implementations.
#[derive(Debug, Clone, Error)]
pub enum IntakeRepositoryError {
    /// The submission was not found.
    #[error("submission not found: {0}")]
    SubmissionNotFound(SubmissionId),

    /// A material entry with the same identifier already exists.
    #[error("duplicate material entry: {0}")]
    DuplicateMaterial(MaterialId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl IntakeRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for failures a caller may retry unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

impl From<diesel::result::Error> for IntakeRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
