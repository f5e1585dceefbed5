//! Service-level errors shared by job services.

use crate::job::{
    domain::{JobDomainError, JobId, NoteId, ParseJobValueError},
    ports::JobRepositoryError,
};
use thiserror::Error;

/// Service-level errors for job operations.
#[derive(Debug, Error)]
pub enum JobServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] JobDomainError),
    /// A stage, status or ledger name could not be parsed.
    #[error(transparent)]
    InvalidValue(#[from] ParseJobValueError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] JobRepositoryError),
    /// No job exists with the given identifier.
    #[error("job {0} not found")]
    NotFound(JobId),
    /// No job holds the given note.
    #[error("note {0} not found")]
    NoteNotFound(NoteId),
    /// Every optimistic write attempt lost to a concurrent writer.
    #[error("job {job_id} still contended after {attempts} write attempts")]
    Contention {
        /// Contended job.
        job_id: JobId,
        /// Attempts made before giving up.
        attempts: u32,
    },
}

impl JobServiceError {
    /// Returns `true` for storage-side failures that may succeed when the
    /// same call is repeated. Validation and not-found failures never are.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Repository(err) => err.is_retryable(),
            Self::Contention { .. } => true,
            Self::Domain(_) | Self::InvalidValue(_) | Self::NotFound(_) | Self::NoteNotFound(_) => {
                false
            }
        }
    }

    /// Returns `true` when the error means a job or note does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::NoteNotFound(_)
                | Self::Repository(JobRepositoryError::NotFound(_))
                | Self::Domain(JobDomainError::NoteNotFound { .. })
        )
    }
}

/// Result type for job service operations.
pub type JobServiceResult<T> = Result<T, JobServiceError>;
