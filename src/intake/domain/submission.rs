//! Field-form submissions awaiting or holding a job link.

use super::{IntakeDomainError, RawAnswer, TransformedSubmission};
use crate::job::domain::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a submission by the form provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Validates and wraps a provider identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeDomainError::EmptySubmissionId`] when `value` is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, IntakeDomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IntakeDomainError::EmptySubmissionId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubmissionId {
    type Error = IntakeDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubmissionId> for String {
    fn from(id: SubmissionId) -> Self {
        id.0
    }
}

impl AsRef<str> for SubmissionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A submission as delivered by the provider's export or webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingSubmission {
    /// Provider identifier.
    pub submission_id: SubmissionId,
    /// Raw service address typed or picked by the technician.
    #[serde(default)]
    pub job_location: String,
    /// Kind of visit.
    #[serde(default)]
    pub job_type: Option<String>,
    /// Time the form was submitted.
    pub submission_timestamp: DateTime<Utc>,
    /// Technician who filled the form.
    #[serde(default)]
    pub technician_name: Option<String>,
    /// Answered questions.
    #[serde(default)]
    pub answers: Vec<RawAnswer>,
}

/// Filter for listing submissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionFilter {
    /// Every submission.
    #[default]
    All,
    /// Submissions without a job link.
    Unlinked,
    /// Submissions already linked to a job.
    Linked,
}

impl SubmissionFilter {
    /// Returns `true` when `submission` passes the filter.
    #[must_use]
    pub const fn accepts(self, submission: &Submission) -> bool {
        match self {
            Self::All => true,
            Self::Unlinked => submission.linked_job_id.is_none(),
            Self::Linked => submission.linked_job_id.is_some(),
        }
    }
}

/// Stored submission record.
///
/// The link to a job is set at most once; later refreshes only touch the
/// content fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    submission_id: SubmissionId,
    job_location: String,
    job_type: Option<String>,
    submission_timestamp: DateTime<Utc>,
    technician_name: Option<String>,
    answers: Vec<RawAnswer>,
    work_description: Option<String>,
    additional_notes: Option<String>,
    parts_materials_needed: Option<String>,
    linked_job_id: Option<JobId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Column values used to rebuild a [`Submission`] from storage.
#[derive(Debug, Clone)]
pub struct PersistedSubmissionData {
    /// Provider identifier.
    pub submission_id: SubmissionId,
    /// Raw service address.
    pub job_location: String,
    /// Kind of visit.
    pub job_type: Option<String>,
    /// Submission time.
    pub submission_timestamp: DateTime<Utc>,
    /// Technician name.
    pub technician_name: Option<String>,
    /// Raw answers.
    pub answers: Vec<RawAnswer>,
    /// Extracted work description.
    pub work_description: Option<String>,
    /// Extracted field notes.
    pub additional_notes: Option<String>,
    /// Extracted materials request.
    pub parts_materials_needed: Option<String>,
    /// Linked job, if matched.
    pub linked_job_id: Option<JobId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// Creates an unlinked record from an incoming submission.
    #[must_use]
    pub fn received(incoming: IncomingSubmission, now: DateTime<Utc>) -> Self {
        let IncomingSubmission {
            submission_id,
            job_location,
            job_type,
            submission_timestamp,
            technician_name,
            answers,
        } = incoming;
        Self {
            submission_id,
            job_location,
            job_type,
            submission_timestamp,
            technician_name,
            answers,
            work_description: None,
            additional_notes: None,
            parts_materials_needed: None,
            linked_job_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a submission from storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSubmissionData) -> Self {
        Self {
            submission_id: data.submission_id,
            job_location: data.job_location,
            job_type: data.job_type,
            submission_timestamp: data.submission_timestamp,
            technician_name: data.technician_name,
            answers: data.answers,
            work_description: data.work_description,
            additional_notes: data.additional_notes,
            parts_materials_needed: data.parts_materials_needed,
            linked_job_id: data.linked_job_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the provider identifier.
    #[must_use]
    pub const fn submission_id(&self) -> &SubmissionId {
        &self.submission_id
    }

    /// Returns the raw service address.
    #[must_use]
    pub fn job_location(&self) -> &str {
        &self.job_location
    }

    /// Returns the visit type.
    #[must_use]
    pub fn job_type(&self) -> Option<&str> {
        self.job_type.as_deref()
    }

    /// Returns the submission time.
    #[must_use]
    pub const fn submission_timestamp(&self) -> DateTime<Utc> {
        self.submission_timestamp
    }

    /// Returns the technician name.
    #[must_use]
    pub fn technician_name(&self) -> Option<&str> {
        self.technician_name.as_deref()
    }

    /// Returns the raw answers.
    #[must_use]
    pub fn answers(&self) -> &[RawAnswer] {
        &self.answers
    }

    /// Returns the extracted work description.
    #[must_use]
    pub fn work_description(&self) -> Option<&str> {
        self.work_description.as_deref()
    }

    /// Returns the extracted field notes.
    #[must_use]
    pub fn additional_notes(&self) -> Option<&str> {
        self.additional_notes.as_deref()
    }

    /// Returns the extracted materials request.
    #[must_use]
    pub fn parts_materials_needed(&self) -> Option<&str> {
        self.parts_materials_needed.as_deref()
    }

    /// Returns the linked job, if any.
    #[must_use]
    pub const fn linked_job_id(&self) -> Option<JobId> {
        self.linked_job_id
    }

    /// Returns `true` once the submission is linked.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.linked_job_id.is_some()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the provider-owned fields with a newer delivery.
    ///
    /// Extracted content and the job link are kept.
    pub fn refresh_from(&mut self, incoming: IncomingSubmission, now: DateTime<Utc>) {
        self.job_location = incoming.job_location;
        self.job_type = incoming.job_type;
        self.submission_timestamp = incoming.submission_timestamp;
        self.technician_name = incoming.technician_name;
        self.answers = incoming.answers;
        self.updated_at = now;
    }

    /// Stores freshly extracted content fields.
    pub fn apply_extraction(&mut self, extracted: &TransformedSubmission, now: DateTime<Utc>) {
        self.work_description.clone_from(&extracted.work_description);
        self.additional_notes.clone_from(&extracted.additional_notes);
        self.parts_materials_needed
            .clone_from(&extracted.parts_materials_needed);
        self.updated_at = now;
    }

    /// Links the submission to `job_id` unless it is already linked.
    ///
    /// Returns the job the submission is linked to after the call.
    pub fn link_to(&mut self, job_id: JobId, now: DateTime<Utc>) -> JobId {
        if let Some(existing) = self.linked_job_id {
            return existing;
        }
        self.linked_job_id = Some(job_id);
        self.updated_at = now;
        job_id
    }

    /// Restores `existing` as the job link when one was already recorded.
    ///
    /// Stores call this before writing so a stale copy never moves a link.
    pub const fn retain_link(&mut self, existing: Option<JobId>) {
        if let Some(job_id) = existing {
            self.linked_job_id = Some(job_id);
        }
    }
}
