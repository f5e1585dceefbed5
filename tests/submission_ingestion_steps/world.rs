//! Shared world state for submission ingestion BDD scenarios.

use std::sync::Arc;

use jobflow::intake::{
    adapters::memory::{InMemoryMaterialRepository, InMemorySubmissionRepository},
    domain::Submission,
    services::{IngestionSummary, SubmissionIngestionService},
};
use jobflow::job::{
    adapters::memory::InMemoryJobRepository,
    domain::Job,
    ports::RandomNoteIds,
    services::JobRegistryService,
};
use mockable::DefaultClock;
use rstest::fixture;

/// Ingestion service over in-memory stores.
pub type TestIngestionService = SubmissionIngestionService<
    InMemoryJobRepository,
    InMemorySubmissionRepository,
    InMemoryMaterialRepository,
    DefaultClock,
>;

/// Scenario world for submission ingestion behaviour tests.
pub struct IngestionWorld {
    pub jobs: Arc<InMemoryJobRepository>,
    pub submissions: Arc<InMemorySubmissionRepository>,
    pub registry: JobRegistryService<InMemoryJobRepository, DefaultClock>,
    pub service: TestIngestionService,
    pub job: Option<Job>,
    pub newer_job: Option<Job>,
    pub received: Vec<Submission>,
    pub last_summary: Option<IngestionSummary>,
}

impl IngestionWorld {
    /// Creates a world over empty stores.
    #[must_use]
    pub fn new() -> Self {
        let jobs = Arc::new(InMemoryJobRepository::new());
        let submissions = Arc::new(InMemorySubmissionRepository::new());
        let clock = Arc::new(DefaultClock);
        Self {
            registry: JobRegistryService::new(Arc::clone(&jobs), Arc::clone(&clock)),
            service: SubmissionIngestionService::new(
                Arc::clone(&jobs),
                Arc::clone(&submissions),
                Arc::new(InMemoryMaterialRepository::new()),
                clock,
                Arc::new(RandomNoteIds),
            ),
            jobs,
            submissions,
            job: None,
            newer_job: None,
            received: Vec::new(),
            last_summary: None,
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

    /// Returns the job created after the scenario's job.
    ///
    /// # Errors
    ///
    /// Returns an error when no newer job has been created.
    pub fn newer_job(&self) -> Result<&Job, eyre::Report> {
        self.newer_job
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing newer job in scenario world"))
    }
}

impl Default for IngestionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> IngestionWorld {
    IngestionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
