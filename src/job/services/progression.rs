//! Service layer for stage step completion and stage transitions.

use super::{JobServiceError, JobServiceResult, JobWriter, WriteRetryConfig};
use crate::job::{
    domain::{Job, JobId, Stage, StageProgress},
    ports::JobRepository,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Stage progression orchestration service.
///
/// Completing a step automatically advances the job when that step was the
/// last incomplete one in its stage.
#[derive(Clone)]
pub struct StageProgressionService<R, C>
where
    R: JobRepository,
    C: Clock + Send + Sync,
{
    writer: JobWriter<R>,
    clock: Arc<C>,
}

impl<R, C> StageProgressionService<R, C>
where
    R: JobRepository,
    C: Clock + Send + Sync,
{
    /// Creates a progression service with the default retry policy.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self::with_config(repository, clock, WriteRetryConfig::default())
    }

    /// Creates a progression service with a custom retry policy.
    #[must_use]
    pub const fn with_config(repository: Arc<R>, clock: Arc<C>, config: WriteRetryConfig) -> Self {
        Self {
            writer: JobWriter::new(repository, config),
            clock,
        }
    }

    /// Marks a step of the job's current stage complete, then advances the
    /// job if the stage is finished.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError::Domain`] with
    /// [`crate::job::domain::JobDomainError::InvalidStep`] when the step does
    /// not belong to the current stage; the job is not written.
    pub async fn complete_step(&self, job_id: JobId, step: &str) -> JobServiceResult<Job> {
        let clock = &*self.clock;
        let (job, advanced) = self
            .writer
            .mutate(job_id, |job| {
                job.complete_step(step, clock)?;
                Ok(job.advance_stage_if_ready(clock))
            })
            .await?;
        debug!(job_id = %job_id, step, stage = %job.stage(), "step completed");
        log_advance(&job, advanced);
        Ok(job)
    }

    /// Marks a step of the job's current stage incomplete.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError::Domain`] when the step does not belong to
    /// the current stage.
    pub async fn uncomplete_step(&self, job_id: JobId, step: &str) -> JobServiceResult<Job> {
        let clock = &*self.clock;
        let (job, ()) = self
            .writer
            .mutate(job_id, |job| job.uncomplete_step(step, clock))
            .await?;
        debug!(job_id = %job_id, step, stage = %job.stage(), "step uncompleted");
        Ok(job)
    }

    /// Returns progress over the job's current stage.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError::NotFound`] when the job does not exist.
    pub async fn stage_progress(&self, job_id: JobId) -> JobServiceResult<StageProgress> {
        let job = self.load(job_id).await?;
        Ok(job.stage_progress())
    }

    /// Advances the job when every required step of its stage is complete.
    ///
    /// Returns the job unchanged when it is not ready or already terminal.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError`] for missing jobs or persistence failures.
    pub async fn advance_if_ready(&self, job_id: JobId) -> JobServiceResult<Job> {
        let clock = &*self.clock;
        let (job, advanced) = self
            .writer
            .mutate(job_id, |job| Ok(job.advance_stage_if_ready(clock)))
            .await?;
        log_advance(&job, advanced);
        Ok(job)
    }

    /// Moves the job to `target` regardless of step completion.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError`] for missing jobs or persistence failures.
    pub async fn move_to_stage(&self, job_id: JobId, target: Stage) -> JobServiceResult<Job> {
        let clock = &*self.clock;
        let (job, from) = self
            .writer
            .mutate(job_id, |job| {
                let from = job.stage();
                job.move_to_stage(target, clock);
                Ok(from)
            })
            .await?;
        info!(job_id = %job_id, from = %from, to = %target, "stage moved manually");
        Ok(job)
    }

    /// Moves the job to the stage named `target`.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError::InvalidValue`] when `target` is not a stage
    /// key, otherwise as [`Self::move_to_stage`].
    pub async fn move_to_stage_named(&self, job_id: JobId, target: &str) -> JobServiceResult<Job> {
        let stage = Stage::try_from(target)?;
        self.move_to_stage(job_id, stage).await
    }

    async fn load(&self, job_id: JobId) -> JobServiceResult<Job> {
        self.writer
            .repository()
            .find_by_id(job_id)
            .await?
            .ok_or(JobServiceError::NotFound(job_id))
    }
}

fn log_advance(job: &Job, advanced: Option<Stage>) {
    if let Some(stage) = advanced {
        info!(job_id = %job.id(), stage = %stage, "job advanced to next stage");
    }
}
