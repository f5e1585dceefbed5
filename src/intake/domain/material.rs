//! Material checklist entries derived from submissions.

use super::{IntakeDomainError, SubmissionId, meaningful};
use crate::job::domain::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a material checklist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(Uuid);

impl MaterialId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for MaterialId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line on the materials checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialEntry {
    /// Entry identifier.
    pub id: MaterialId,
    /// Submission the request came from.
    pub submission_id: SubmissionId,
    /// Job the materials are for, once the submission is linked.
    pub job_id: Option<JobId>,
    /// Requested materials as written by the technician.
    pub material_description: String,
    /// Whether the office has ordered the materials.
    pub ordered: bool,
    /// When the materials were ordered.
    pub ordered_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl MaterialEntry {
    /// Creates an unlinked, unordered entry.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeDomainError::EmptyMaterialDescription`] when the
    /// description is blank or a not-applicable placeholder.
    pub fn new(
        submission_id: SubmissionId,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, IntakeDomainError> {
        let material_description =
            meaningful(description.into()).ok_or(IntakeDomainError::EmptyMaterialDescription)?;
        Ok(Self {
            id: MaterialId::new(),
            submission_id,
            job_id: None,
            material_description,
            ordered: false,
            ordered_at: None,
            created_at: now,
        })
    }

    /// Attaches the entry to `job_id`.
    pub const fn link_to(&mut self, job_id: JobId) {
        self.job_id = Some(job_id);
    }

    /// Marks the materials as ordered, keeping the first order time.
    pub fn mark_ordered(&mut self, now: DateTime<Utc>) {
        self.ordered = true;
        self.ordered_at.get_or_insert(now);
    }
}
