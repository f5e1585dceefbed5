//! In-memory submission repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::intake::{
    domain::{Submission, SubmissionFilter, SubmissionId},
    ports::{IntakeRepositoryError, IntakeRepositoryResult, SubmissionRepository},
};

/// Thread-safe in-memory submission repository.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubmissionRepository {
    state: Arc<RwLock<HashMap<SubmissionId, Submission>>>,
}

impl InMemorySubmissionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: &impl ToString) -> IntakeRepositoryError {
    IntakeRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn upsert(&self, submission: &Submission) -> IntakeRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        let id = submission.submission_id();
        let mut record = submission.clone();
        record.retain_link(state.get(id).and_then(Submission::linked_job_id));
        state.insert(id.clone(), record);
        Ok(())
    }

    async fn find_by_id(&self, id: &SubmissionId) -> IntakeRepositoryResult<Option<Submission>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.get(id).cloned())
    }

    async fn list(&self, filter: SubmissionFilter) -> IntakeRepositoryResult<Vec<Submission>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        let mut submissions: Vec<Submission> = state
            .values()
            .filter(|submission| filter.accepts(submission))
            .cloned()
            .collect();
        submissions.sort_by(|a, b| {
            a.submission_timestamp()
                .cmp(&b.submission_timestamp())
                .then_with(|| a.submission_id().cmp(b.submission_id()))
        });
        Ok(submissions)
    }

    async fn update(&self, submission: &Submission) -> IntakeRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        let slot = state
            .get_mut(submission.submission_id())
            .ok_or_else(|| {
                IntakeRepositoryError::SubmissionNotFound(submission.submission_id().clone())
            })?;
        let existing = slot.linked_job_id();
        *slot = submission.clone();
        slot.retain_link(existing);
        Ok(())
    }
}
