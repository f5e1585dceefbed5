//! Optimistic read-modify-write helper shared by every job mutation.

use super::{JobServiceError, JobServiceResult};
use crate::job::{
    domain::{Job, JobDomainError, JobId},
    ports::{JobRepository, JobRepositoryError},
};
use std::sync::Arc;
use tracing::debug;

/// Retry policy for optimistic job writes.
///
/// # Examples
///
/// ```
/// use jobflow::job::services::WriteRetryConfig;
///
/// assert_eq!(WriteRetryConfig::default().max_attempts, 5);
/// assert_eq!(WriteRetryConfig::no_retry().max_attempts, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRetryConfig {
    /// Total attempts, including the first, before reporting contention.
    pub max_attempts: u32,
}

impl Default for WriteRetryConfig {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

impl WriteRetryConfig {
    /// A policy that gives up on the first conflict.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self { max_attempts: 1 }
    }
}

/// Applies in-memory mutations to jobs and writes them back conditionally.
///
/// Each attempt re-reads the job, so a mutation never works on stale state.
/// Concurrent writers therefore cannot lose each other's step flags or notes.
#[derive(Debug)]
pub struct JobWriter<R>
where
    R: JobRepository,
{
    repository: Arc<R>,
    config: WriteRetryConfig,
}

impl<R> Clone for JobWriter<R>
where
    R: JobRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            config: self.config,
        }
    }
}

impl<R> JobWriter<R>
where
    R: JobRepository,
{
    /// Creates a writer over `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>, config: WriteRetryConfig) -> Self {
        Self { repository, config }
    }

    /// Returns the underlying repository.
    #[must_use]
    pub const fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn config(&self) -> WriteRetryConfig {
        self.config
    }

    /// Loads `job_id`, applies `apply`, and writes the result back.
    ///
    /// The write is skipped when `apply` leaves the job unchanged. Domain
    /// errors abort immediately; version conflicts are retried.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError::NotFound`] when the job does not exist,
    /// [`JobServiceError::Domain`] when `apply` rejects the change,
    /// [`JobServiceError::Contention`] when every attempt conflicted, or
    /// [`JobServiceError::Repository`] for persistence failures.
    pub async fn mutate<T, F>(&self, job_id: JobId, mut apply: F) -> JobServiceResult<(Job, T)>
    where
        F: FnMut(&mut Job) -> Result<T, JobDomainError> + Send,
        T: Send,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempts = 0_u32;
        loop {
            attempts = attempts.saturating_add(1);
            let mut job = self
                .repository
                .find_by_id(job_id)
                .await?
                .ok_or(JobServiceError::NotFound(job_id))?;
            let before = job.clone();
            let outcome = apply(&mut job)?;
            if job == before {
                return Ok((job, outcome));
            }

            match self.repository.update(&job).await {
                Ok(version) => {
                    job.record_version(version);
                    return Ok((job, outcome));
                }
                Err(JobRepositoryError::VersionConflict { .. }) if attempts < max_attempts => {
                    debug!(job_id = %job_id, attempts, "job write conflicted; retrying");
                }
                Err(JobRepositoryError::VersionConflict { .. }) => {
                    return Err(JobServiceError::Contention { job_id, attempts });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
