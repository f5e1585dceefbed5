//! Submission ingestion pipeline.
//!
//! Each submission is processed on its own: re-read the stored record, keep
//! its job link or resolve the job by address, extract structured content,
//! append notes to the job's ledgers, link the submission's material entries,
//! then record the link. A failure on one
//! submission is reported in the summary and the batch carries on.

use super::{ExistingJobResolver, IntakeServiceError, IntakeServiceResult};
use crate::intake::{
    domain::{
        IncomingSubmission, MaterialEntry, Submission, SubmissionFilter, SubmissionId,
        SubmissionTransformer, TransformedSubmission,
    },
    ports::{IntakeRepositoryError, MaterialRepository, SubmissionRepository},
};
use crate::job::{
    domain::{Job, JobDomainError, JobId, LedgerKind, NewNote, NoteStatus},
    ports::{JobRepository, NoteIdGenerator},
    services::{JobWriter, WriteRetryConfig},
};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Author recorded on notes from submissions without a technician name.
pub const DEFAULT_NOTE_AUTHOR: &str = "ConnectTeam";

/// Outcome counts of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestionSummary {
    /// Submissions linked to a job during or before this run.
    pub linked: usize,
    /// Submissions with no usable address or no matching job.
    pub unmatched: usize,
    /// Submissions that failed.
    pub errors: Vec<IngestionFailure>,
}

/// A submission that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionFailure {
    /// Failed submission.
    pub submission_id: SubmissionId,
    /// Error message.
    pub message: String,
    /// Whether a later run may succeed unchanged.
    pub retryable: bool,
}

enum Outcome {
    Linked { job_id: JobId, notes: usize },
    Unmatched,
}

/// Orchestrates submission intake against the job store.
pub struct SubmissionIngestionService<J, S, M, C>
where
    J: JobRepository,
    S: SubmissionRepository,
    M: MaterialRepository,
    C: Clock + Send + Sync,
{
    writer: JobWriter<J>,
    resolver: ExistingJobResolver<J>,
    submissions: Arc<S>,
    materials: Arc<M>,
    transformer: SubmissionTransformer,
    clock: Arc<C>,
    ids: Arc<dyn NoteIdGenerator>,
}

impl<J, S, M, C> SubmissionIngestionService<J, S, M, C>
where
    J: JobRepository,
    S: SubmissionRepository,
    M: MaterialRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service with the default question map and retry policy.
    #[must_use]
    pub fn new(
        jobs: Arc<J>,
        submissions: Arc<S>,
        materials: Arc<M>,
        clock: Arc<C>,
        ids: Arc<dyn NoteIdGenerator>,
    ) -> Self {
        Self {
            writer: JobWriter::new(Arc::clone(&jobs), WriteRetryConfig::default()),
            resolver: ExistingJobResolver::new(jobs),
            submissions,
            materials,
            transformer: SubmissionTransformer::default(),
            clock,
            ids,
        }
    }

    /// Replaces the answer transformer.
    #[must_use]
    pub fn with_transformer(mut self, transformer: SubmissionTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    /// Replaces the job write retry policy.
    #[must_use]
    pub fn with_retry_config(mut self, config: WriteRetryConfig) -> Self {
        self.writer = JobWriter::new(Arc::clone(self.writer.repository()), config);
        self
    }

    /// Stores an incoming submission, keyed by its provider identifier.
    ///
    /// A redelivery refreshes the provider fields and never clears an
    /// existing job link. The first delivery carrying a meaningful materials
    /// answer creates the submission's material checklist entry.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeServiceError::Repository`] when persistence fails.
    pub async fn receive(&self, incoming: IncomingSubmission) -> IntakeServiceResult<Submission> {
        let now = self.clock.utc();
        let stored = self.submissions.find_by_id(&incoming.submission_id).await?;
        let mut submission = if let Some(mut existing) = stored {
            existing.refresh_from(incoming, now);
            existing
        } else {
            Submission::received(incoming, now)
        };
        let extracted = self.transformer.transform(submission.answers());
        submission.apply_extraction(&extracted, now);
        self.submissions.upsert(&submission).await?;

        if let Some(materials) = extracted.parts_materials_needed {
            let id = submission.submission_id();
            if self.materials.find_by_submission(id).await?.is_empty() {
                let mut entry = MaterialEntry::new(id.clone(), materials, now)?;
                if let Some(job_id) = submission.linked_job_id() {
                    entry.link_to(job_id);
                }
                self.materials.insert(&entry).await?;
                debug!(submission_id = %id, material_id = %entry.id, "material entry created");
            }
        }
        Ok(submission)
    }

    /// Ingests `submissions` in order and reports what happened to each.
    ///
    /// Each entry only names a submission: the stored record is re-read and
    /// used in place of the passed copy. Already-linked submissions keep
    /// their job even when their address is now blank or matches a newer
    /// job; their content is refreshed and any notes missing from the job are
    /// appended. A ledger never receives two notes from the same submission.
    pub async fn ingest(&self, submissions: &[Submission]) -> IngestionSummary {
        let mut summary = IngestionSummary::default();
        for submission in submissions {
            let id = submission.submission_id();
            match self.ingest_one(submission).await {
                Ok(Outcome::Linked { job_id, notes }) => {
                    debug!(submission_id = %id, job_id = %job_id, notes, "submission linked");
                    summary.linked = summary.linked.saturating_add(1);
                }
                Ok(Outcome::Unmatched) => {
                    debug!(submission_id = %id, "submission unmatched");
                    summary.unmatched = summary.unmatched.saturating_add(1);
                }
                Err(err) => {
                    warn!(submission_id = %id, error = %err, "submission ingestion failed");
                    summary.errors.push(IngestionFailure {
                        submission_id: id.clone(),
                        message: err.to_string(),
                        retryable: err.is_retryable(),
                    });
                }
            }
        }
        info!(
            linked = summary.linked,
            unmatched = summary.unmatched,
            failed = summary.errors.len(),
            "ingestion batch finished"
        );
        summary
    }

    /// Ingests every submission that has no job link yet.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeServiceError::Repository`] when listing fails.
    pub async fn ingest_pending(&self) -> IntakeServiceResult<IngestionSummary> {
        let pending = self.submissions.list(SubmissionFilter::Unlinked).await?;
        Ok(self.ingest(&pending).await)
    }

    /// Re-runs extraction over every linked submission.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeServiceError::Repository`] when listing fails.
    pub async fn resync_linked(&self) -> IntakeServiceResult<IngestionSummary> {
        let linked = self.submissions.list(SubmissionFilter::Linked).await?;
        Ok(self.ingest(&linked).await)
    }

    async fn ingest_one(&self, submission: &Submission) -> IntakeServiceResult<Outcome> {
        let id = submission.submission_id();
        let stored = self
            .submissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| IntakeRepositoryError::SubmissionNotFound(id.clone()))?;

        let job_id = match stored.linked_job_id() {
            Some(linked) => linked,
            None => match self
                .resolver
                .find_existing_job(stored.job_location())
                .await?
            {
                Some(found) => found,
                None => return Ok(Outcome::Unmatched),
            },
        };

        let extracted = self.transformer.transform(stored.answers());
        let notes = self.append_notes(job_id, &stored, &extracted).await?;

        let materials = self.materials.link_to_job(id, job_id).await?;
        debug!(submission_id = %id, job_id = %job_id, materials, "materials linked");

        let now = self.clock.utc();
        let mut updated = stored;
        updated.apply_extraction(&extracted, now);
        let linked = updated.link_to(job_id, now);
        self.submissions.update(&updated).await?;
        Ok(Outcome::Linked {
            job_id: linked,
            notes,
        })
    }

    async fn append_notes(
        &self,
        job_id: JobId,
        submission: &Submission,
        extracted: &TransformedSubmission,
    ) -> Result<usize, IntakeServiceError> {
        let clock = &*self.clock;
        let ids = &*self.ids;
        let submission_id = submission.submission_id().as_str();
        let author = submission.technician_name().unwrap_or(DEFAULT_NOTE_AUTHOR);
        let entries = [
            (LedgerKind::Boss, extracted.manager_note.as_deref()),
            (LedgerKind::Additional, extracted.additional_notes.as_deref()),
            (
                LedgerKind::Materials,
                extracted.parts_materials_needed.as_deref(),
            ),
        ];
        if entries.iter().all(|(_, text)| text.is_none()) {
            return Ok(0);
        }

        let (_, appended) = self
            .writer
            .mutate(job_id, |job| {
                append_submission_notes(
                    job,
                    &entries,
                    extracted.manager_status,
                    submission_id,
                    author,
                    ids,
                    clock,
                )
            })
            .await?;
        Ok(appended)
    }
}

/// Appends each non-empty field to its ledger unless the ledger already holds
/// a note from `submission_id`.
fn append_submission_notes(
    job: &mut Job,
    entries: &[(LedgerKind, Option<&str>)],
    manager_status: Option<NoteStatus>,
    submission_id: &str,
    author: &str,
    ids: &dyn NoteIdGenerator,
    clock: &impl Clock,
) -> Result<usize, JobDomainError> {
    let mut appended = 0_usize;
    for &(kind, text) in entries {
        let Some(body) = text else { continue };
        if job.ledger(kind).has_submission(submission_id) {
            continue;
        }
        let request = NewNote::new(ids.next_note_id(), body, author).with_submission(submission_id);
        let note = job.append_note(kind, request, clock)?;
        appended = appended.saturating_add(1);

        match (kind, manager_status) {
            (LedgerKind::Boss, Some(status)) if status != NoteStatus::Undone => {
                job.set_note_status(note.id, status, clock)?;
            }
            _ => {}
        }
    }
    Ok(appended)
}
