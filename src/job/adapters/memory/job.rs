//! In-memory job repository for tests and embedders.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::job::{
    domain::{Job, JobId, JobVersion, NoteId},
    ports::{JobRepository, JobRepositoryError, JobRepositoryResult},
};

/// Thread-safe in-memory job repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobRepository {
    state: Arc<RwLock<InMemoryJobState>>,
}

#[derive(Debug, Default)]
struct InMemoryJobState {
    jobs: HashMap<JobId, Job>,
    note_index: HashMap<NoteId, JobId>,
}

impl InMemoryJobRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: &impl ToString) -> JobRepositoryError {
    JobRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Replaces the note index entries of `job` with its current note IDs.
fn reindex_notes(state: &mut InMemoryJobState, job: &Job) {
    let job_id = job.id();
    state.note_index.retain(|_, owner| *owner != job_id);
    for note_id in job.note_ids() {
        state.note_index.insert(note_id, job_id);
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn store(&self, job: &Job) -> JobRepositoryResult<JobVersion> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        if state.jobs.contains_key(&job.id()) {
            return Err(JobRepositoryError::DuplicateJob(job.id()));
        }
        if state
            .jobs
            .values()
            .any(|existing| existing.job_number() == job.job_number())
        {
            return Err(JobRepositoryError::DuplicateJobNumber(
                job.job_number().clone(),
            ));
        }

        let mut stored = job.clone();
        let version = JobVersion::INITIAL.next();
        stored.record_version(version);
        reindex_notes(&mut state, &stored);
        state.jobs.insert(stored.id(), stored);
        Ok(version)
    }

    async fn update(&self, job: &Job) -> JobRepositoryResult<JobVersion> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        let current = state
            .jobs
            .get(&job.id())
            .ok_or(JobRepositoryError::NotFound(job.id()))?
            .version();
        if current != job.version() {
            return Err(JobRepositoryError::VersionConflict {
                job_id: job.id(),
                expected: job.version(),
            });
        }

        let mut stored = job.clone();
        let version = current.next();
        stored.record_version(version);
        reindex_notes(&mut state, &stored);
        state.jobs.insert(stored.id(), stored);
        Ok(version)
    }

    async fn find_by_id(&self, id: JobId) -> JobRepositoryResult<Option<Job>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.jobs.get(&id).cloned())
    }

    async fn list_active(&self) -> JobRepositoryResult<Vec<Job>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        let mut jobs: Vec<Job> = state
            .jobs
            .values()
            .filter(|job| job.is_active())
            .cloned()
            .collect();
        jobs.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.job_number().cmp(a.job_number()))
        });
        Ok(jobs)
    }

    async fn find_by_note_id(&self, note_id: NoteId) -> JobRepositoryResult<Option<Job>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        let job = state
            .note_index
            .get(&note_id)
            .and_then(|job_id| state.jobs.get(job_id))
            .cloned();
        Ok(job)
    }

    async fn count_created_on(&self, day: NaiveDate) -> JobRepositoryResult<u32> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        let count = state
            .jobs
            .values()
            .filter(|job| job.created_at().date_naive() == day)
            .count();
        u32::try_from(count).map_err(JobRepositoryError::persistence)
    }
}
