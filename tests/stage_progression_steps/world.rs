//! Shared world state for stage progression BDD scenarios.

use std::sync::Arc;

use jobflow::job::{
    adapters::memory::InMemoryJobRepository,
    domain::Job,
    services::{JobRegistryService, JobServiceError, StageProgressionService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Scenario world for stage progression behaviour tests.
pub struct StageProgressionWorld {
    pub registry: JobRegistryService<InMemoryJobRepository, DefaultClock>,
    pub progression: StageProgressionService<InMemoryJobRepository, DefaultClock>,
    pub job: Option<Job>,
    pub last_result: Option<Result<Job, JobServiceError>>,
}

impl StageProgressionWorld {
    /// Creates a world over an empty job store.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryJobRepository::new());
        let clock = Arc::new(DefaultClock);
        Self {
            registry: JobRegistryService::new(Arc::clone(&repository), Arc::clone(&clock)),
            progression: StageProgressionService::new(repository, clock),
            job: None,
            last_result: None,
        }
    }

    /// Returns the scenario's job.
    ///
    /// # Errors
    ///
    /// Returns an error when no job has been created yet.
    pub fn job(&self) -> Result<&Job, eyre::Report> {
        self.job
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing job in scenario world"))
    }
}

impl Default for StageProgressionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> StageProgressionWorld {
    StageProgressionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
