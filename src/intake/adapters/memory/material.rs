//! In-memory material checklist repository.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::intake::{
    domain::{MaterialEntry, MaterialId, SubmissionId},
    ports::{IntakeRepositoryError, IntakeRepositoryResult, MaterialRepository},
};
use crate::job::domain::JobId;

/// Thread-safe in-memory material repository preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMaterialRepository {
    state: Arc<RwLock<Vec<MaterialEntry>>>,
}

impl InMemoryMaterialRepository {
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
impl MaterialRepository for InMemoryMaterialRepository {
    async fn insert(&self, entry: &MaterialEntry) -> IntakeRepositoryResult<MaterialId> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        if state.iter().any(|existing| existing.id == entry.id) {
            return Err(IntakeRepositoryError::DuplicateMaterial(entry.id));
        }
        state.push(entry.clone());
        Ok(entry.id)
    }

    async fn link_to_job(
        &self,
        submission_id: &SubmissionId,
        job_id: JobId,
    ) -> IntakeRepositoryResult<usize> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        let mut linked = 0_usize;
        for entry in state
            .iter_mut()
            .filter(|entry| &entry.submission_id == submission_id && entry.job_id.is_none())
        {
            entry.link_to(job_id);
            linked = linked.saturating_add(1);
        }
        Ok(linked)
    }

    async fn find_by_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> IntakeRepositoryResult<Vec<MaterialEntry>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state
            .iter()
            .filter(|entry| &entry.submission_id == submission_id)
            .cloned()
            .collect())
    }
}
