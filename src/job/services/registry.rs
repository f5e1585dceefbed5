//! Service layer for job creation and coarse status changes.

use super::{JobServiceError, JobServiceResult, JobWriter, WriteRetryConfig};
use crate::job::{
    domain::{Job, JobId, JobNumber, JobStatus},
    ports::{JobRepository, JobRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Request payload for creating a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateJobRequest {
    service_address: String,
    status: Option<JobStatus>,
}

impl CreateJobRequest {
    /// Creates a request for a job at `service_address`.
    #[must_use]
    pub fn new(service_address: impl Into<String>) -> Self {
        Self {
            service_address: service_address.into(),
            status: None,
        }
    }

    /// Sets the initial coarse status.
    #[must_use]
    pub const fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Job registry orchestration service.
#[derive(Clone)]
pub struct JobRegistryService<R, C>
where
    R: JobRepository,
    C: Clock + Send + Sync,
{
    writer: JobWriter<R>,
    clock: Arc<C>,
}

impl<R, C> JobRegistryService<R, C>
where
    R: JobRepository,
    C: Clock + Send + Sync,
{
    /// Creates a registry service with the default retry policy.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self::with_config(repository, clock, WriteRetryConfig::default())
    }

    /// Creates a registry service with a custom retry policy.
    #[must_use]
    pub const fn with_config(repository: Arc<R>, clock: Arc<C>, config: WriteRetryConfig) -> Self {
        Self {
            writer: JobWriter::new(repository, config),
            clock,
        }
    }

    /// Creates a job with the next job number of the current day.
    ///
    /// A job number taken by a concurrent creation is recounted and retried
    /// under the writer's retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError::Domain`] for a blank address or
    /// [`JobServiceError::Repository`] when persistence fails.
    pub async fn create_job(&self, request: CreateJobRequest) -> JobServiceResult<Job> {
        let clock = &*self.clock;
        let repository = self.writer.repository();
        let max_attempts = self.writer.config().max_attempts.max(1);
        let mut attempts = 0_u32;
        loop {
            attempts = attempts.saturating_add(1);
            let day = clock.utc().date_naive();
            let created_today = repository.count_created_on(day).await?;
            let job_number = JobNumber::for_day(day, created_today.saturating_add(1))?;

            let mut job = Job::new(job_number, request.service_address.as_str(), clock)?;
            if let Some(status) = request.status {
                job.set_status(status, clock);
            }
            match repository.store(&job).await {
                Ok(version) => {
                    job.record_version(version);
                    info!(job_id = %job.id(), job_number = %job.job_number(), "job created");
                    return Ok(job);
                }
                Err(JobRepositoryError::DuplicateJobNumber(taken)) if attempts < max_attempts => {
                    debug!(job_number = %taken, attempts, "job number taken; recounting");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Sets the coarse status of a job.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError::NotFound`] when the job does not exist or
    /// [`JobServiceError::Repository`] when persistence fails.
    pub async fn set_status(&self, job_id: JobId, status: JobStatus) -> JobServiceResult<Job> {
        let clock = &*self.clock;
        let (job, ()) = self
            .writer
            .mutate(job_id, |job| {
                job.set_status(status, clock);
                Ok(())
            })
            .await?;
        info!(job_id = %job_id, status = %status, "job status changed");
        Ok(job)
    }

    /// Retrieves a job by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError::NotFound`] when the job does not exist.
    pub async fn get(&self, job_id: JobId) -> JobServiceResult<Job> {
        self.writer
            .repository()
            .find_by_id(job_id)
            .await?
            .ok_or(JobServiceError::NotFound(job_id))
    }
}
