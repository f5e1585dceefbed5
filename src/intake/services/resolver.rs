//! Matching of raw addresses against active jobs.

use crate::intake::domain::NormalizedAddress;
use crate::job::{
    domain::JobId,
    ports::{JobRepository, JobRepositoryResult},
};
use std::sync::Arc;
use tracing::debug;

/// Finds the active job a field submission belongs to.
#[derive(Debug)]
pub struct ExistingJobResolver<J>
where
    J: JobRepository,
{
    jobs: Arc<J>,
}

impl<J> Clone for ExistingJobResolver<J>
where
    J: JobRepository,
{
    fn clone(&self) -> Self {
        Self {
            jobs: Arc::clone(&self.jobs),
        }
    }
}

impl<J> ExistingJobResolver<J>
where
    J: JobRepository,
{
    /// Creates a resolver over the job store.
    #[must_use]
    pub const fn new(jobs: Arc<J>) -> Self {
        Self { jobs }
    }

    /// Returns the most recently created non-archived job whose address
    /// normalises to the same form as `raw_address`.
    ///
    /// Blank addresses never match and do not touch the store.
    ///
    /// # Errors
    ///
    /// Returns the repository error when listing jobs fails.
    pub async fn find_existing_job(&self, raw_address: &str) -> JobRepositoryResult<Option<JobId>> {
        let Some(target) = NormalizedAddress::parse(raw_address) else {
            return Ok(None);
        };

        let found = self
            .jobs
            .list_active()
            .await?
            .into_iter()
            .find(|job| target.matches(job.service_address()))
            .map(|job| job.id());
        debug!(address = %target, matched = found.is_some(), "resolved submission address");
        Ok(found)
    }
}
