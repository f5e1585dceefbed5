//! Service-level errors for intake operations.

use crate::intake::{domain::IntakeDomainError, ports::IntakeRepositoryError};
use crate::job::{ports::JobRepositoryError, services::JobServiceError};
use thiserror::Error;

/// Errors raised while receiving or ingesting submissions.
#[derive(Debug, Error)]
pub enum IntakeServiceError {
    /// An intake record failed validation.
    #[error(transparent)]
    Domain(#[from] IntakeDomainError),
    /// Submission or material persistence failed.
    #[error(transparent)]
    Repository(#[from] IntakeRepositoryError),
    /// Reading jobs failed.
    #[error(transparent)]
    JobRepository(#[from] JobRepositoryError),
    /// Writing notes onto the resolved job failed.
    #[error(transparent)]
    Job(#[from] JobServiceError),
}

impl IntakeServiceError {
    /// Returns `true` for storage-side failures that may succeed on a later
    /// run.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Domain(_) => false,
            Self::Repository(err) => err.is_retryable(),
            Self::JobRepository(err) => err.is_retryable(),
            Self::Job(err) => err.is_retryable(),
        }
    }
}

/// Result type for intake service operations.
pub type IntakeServiceResult<T> = Result<T, IntakeServiceError>;
