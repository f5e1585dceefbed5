//! Job aggregate root: stage progression, coarse status and note ledgers.

use super::{
    JobDomainError, JobId, JobNumber, JobStatus, JobVersion, LedgerKind, NewNote, Note, NoteId,
    NoteLedger, NoteStatus, Stage, StageHistory, StageProgress, StageSteps, StageTable,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Job aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    job_number: JobNumber,
    service_address: String,
    status: JobStatus,
    stage: Stage,
    stage_steps: StageSteps,
    stage_history: StageHistory,
    boss_notes_status: NoteLedger,
    additional_notes_status: NoteLedger,
    materials_notes_status: NoteLedger,
    version: JobVersion,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted job aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedJobData {
    /// Persisted job identifier.
    pub id: JobId,
    /// Persisted human-readable number.
    pub job_number: JobNumber,
    /// Persisted service address.
    pub service_address: String,
    /// Persisted coarse status.
    pub status: JobStatus,
    /// Persisted pipeline stage.
    pub stage: Stage,
    /// Persisted per-stage step flags.
    pub stage_steps: StageSteps,
    /// Persisted stage audit trail.
    pub stage_history: StageHistory,
    /// Persisted boss notes ledger.
    pub boss_notes_status: NoteLedger,
    /// Persisted field notes ledger.
    pub additional_notes_status: NoteLedger,
    /// Persisted materials notes ledger.
    pub materials_notes_status: NoteLedger,
    /// Persisted optimistic concurrency version.
    pub version: JobVersion,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Creates a new job at the first pipeline stage.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::EmptyServiceAddress`] when the address is
    /// blank.
    pub fn new(
        job_number: JobNumber,
        service_address: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, JobDomainError> {
        let raw_address = service_address.into();
        let address = raw_address.trim();
        if address.is_empty() {
            return Err(JobDomainError::EmptyServiceAddress);
        }

        let timestamp = clock.utc();
        let stage = StageTable::initial();
        Ok(Self {
            id: JobId::new(),
            job_number,
            service_address: address.to_owned(),
            status: JobStatus::NotScheduled,
            stage,
            stage_steps: StageSteps::starting_at(stage),
            stage_history: StageHistory::opened_at(stage, timestamp),
            boss_notes_status: NoteLedger::new(),
            additional_notes_status: NoteLedger::new(),
            materials_notes_status: NoteLedger::new(),
            version: JobVersion::INITIAL,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a job from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedJobData) -> Self {
        Self {
            id: data.id,
            job_number: data.job_number,
            service_address: data.service_address,
            status: data.status,
            stage: data.stage,
            stage_steps: data.stage_steps,
            stage_history: data.stage_history,
            boss_notes_status: data.boss_notes_status,
            additional_notes_status: data.additional_notes_status,
            materials_notes_status: data.materials_notes_status,
            version: data.version,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the job identifier.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Returns the human-readable job number.
    #[must_use]
    pub const fn job_number(&self) -> &JobNumber {
        &self.job_number
    }

    /// Returns the service address as entered.
    #[must_use]
    pub fn service_address(&self) -> &str {
        &self.service_address
    }

    /// Returns the coarse lifecycle status.
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        self.status
    }

    /// Returns the current pipeline stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the per-stage step flags.
    #[must_use]
    pub const fn stage_steps(&self) -> &StageSteps {
        &self.stage_steps
    }

    /// Returns the stage audit trail.
    #[must_use]
    pub const fn stage_history(&self) -> &StageHistory {
        &self.stage_history
    }

    /// Returns the optimistic concurrency version the job was read at.
    #[must_use]
    pub const fn version(&self) -> JobVersion {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the ledger of the given kind.
    #[must_use]
    pub const fn ledger(&self, kind: LedgerKind) -> &NoteLedger {
        match kind {
            LedgerKind::Boss => &self.boss_notes_status,
            LedgerKind::Additional => &self.additional_notes_status,
            LedgerKind::Materials => &self.materials_notes_status,
        }
    }

    const fn ledger_mut(&mut self, kind: LedgerKind) -> &mut NoteLedger {
        match kind {
            LedgerKind::Boss => &mut self.boss_notes_status,
            LedgerKind::Additional => &mut self.additional_notes_status,
            LedgerKind::Materials => &mut self.materials_notes_status,
        }
    }

    /// Returns `true` when the job is not archived.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Marks a required step of the current stage as complete.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::InvalidStep`] when `step` is not a required
    /// step of the current stage; the job is left unchanged.
    pub fn complete_step(&mut self, step: &str, clock: &impl Clock) -> Result<(), JobDomainError> {
        self.set_step(step, true, clock)
    }

    /// Marks a required step of the current stage as incomplete.
    ///
    /// Un-completing is always allowed, even when it contradicts stages that
    /// were already entered.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::InvalidStep`] when `step` is not a required
    /// step of the current stage.
    pub fn uncomplete_step(
        &mut self,
        step: &str,
        clock: &impl Clock,
    ) -> Result<(), JobDomainError> {
        self.set_step(step, false, clock)
    }

    fn set_step(&mut self, step: &str, done: bool, clock: &impl Clock) -> Result<(), JobDomainError> {
        if !self.stage.definition().requires(step) {
            return Err(JobDomainError::InvalidStep {
                job_id: self.id,
                stage: self.stage,
                step: step.to_owned(),
            });
        }
        self.stage_steps.set(self.stage, step, done);
        self.touch(clock);
        Ok(())
    }

    /// Returns progress over the current stage's required steps.
    #[must_use]
    pub fn stage_progress(&self) -> StageProgress {
        self.stage_steps.progress(self.stage)
    }

    /// Returns `true` when the current stage is non-terminal and every
    /// required step is complete.
    #[must_use]
    pub fn is_ready_to_advance(&self) -> bool {
        !self.stage.is_terminal() && self.stage_progress().is_complete()
    }

    /// Advances to the successor stage when every required step is complete.
    ///
    /// Stamps `completed_at` on the current history entry, opens a new one,
    /// and resets the new stage's steps. Returns the entered stage, or `None`
    /// when the job is not ready or already terminal.
    pub fn advance_stage_if_ready(&mut self, clock: &impl Clock) -> Option<Stage> {
        if !self.is_ready_to_advance() {
            return None;
        }
        let next = self.stage.next()?;
        let now = clock.utc();
        self.stage_history.complete_latest(now);
        self.enter_stage(next, now, false);
        self.stage_steps.reset(next);
        self.updated_at = now;
        Some(next)
    }

    /// Moves the job to any stage regardless of step completion.
    ///
    /// Backward and repeated moves are permitted. Recorded step flags of the
    /// target stage are kept so a job moved back does not lose its progress.
    pub fn move_to_stage(&mut self, target: Stage, clock: &impl Clock) {
        let now = clock.utc();
        self.enter_stage(target, now, true);
        self.stage_steps.ensure(target);
        self.updated_at = now;
    }

    fn enter_stage(&mut self, stage: Stage, at: DateTime<Utc>, manual: bool) {
        self.stage = stage;
        self.stage_history.enter(stage, at, manual);
        if let Some(implied) = JobStatus::implied_by(stage) {
            self.status = self.status.max(implied);
        }
    }

    /// Sets the coarse lifecycle status.
    pub fn set_status(&mut self, status: JobStatus, clock: &impl Clock) {
        self.status = status;
        self.touch(clock);
    }

    /// Appends a note to the given ledger.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::EmptyNoteText`] for blank text or
    /// [`JobDomainError::DuplicateNoteId`] when the identifier is taken.
    pub fn append_note(
        &mut self,
        kind: LedgerKind,
        note: NewNote,
        clock: &impl Clock,
    ) -> Result<Note, JobDomainError> {
        let now = clock.utc();
        let appended = self.ledger_mut(kind).append(note, now)?;
        self.updated_at = now;
        Ok(appended)
    }

    /// Sets the status of a note in whichever ledger holds it.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::NoteNotFound`] when none of the ledgers
    /// contain the note.
    pub fn set_note_status(
        &mut self,
        note_id: NoteId,
        status: NoteStatus,
        clock: &impl Clock,
    ) -> Result<(LedgerKind, Note), JobDomainError> {
        let now = clock.utc();
        let kind = self
            .find_note(note_id)
            .map(|(kind, _)| kind)
            .ok_or(JobDomainError::NoteNotFound {
                job_id: self.id,
                note_id,
            })?;
        let updated = self
            .ledger_mut(kind)
            .set_status(note_id, status, now)
            .cloned()
            .ok_or(JobDomainError::NoteNotFound {
                job_id: self.id,
                note_id,
            })?;
        self.updated_at = now;
        Ok((kind, updated))
    }

    /// Locates a note across the three ledgers.
    #[must_use]
    pub fn find_note(&self, note_id: NoteId) -> Option<(LedgerKind, &Note)> {
        LedgerKind::ALL
            .into_iter()
            .find_map(|kind| self.ledger(kind).get(note_id).map(|note| (kind, note)))
    }

    /// Iterates over every note identifier in every ledger.
    pub fn note_ids(&self) -> impl Iterator<Item = NoteId> + '_ {
        LedgerKind::ALL
            .into_iter()
            .flat_map(|kind| self.ledger(kind).iter().map(|note| note.id))
    }

    /// Stamps `synced_at` on every note lacking it, across all ledgers.
    ///
    /// Returns the number of notes stamped; `updated_at` only moves when at
    /// least one note changed.
    pub fn backfill_synced_at(&mut self, clock: &impl Clock) -> usize {
        let stamped: usize = LedgerKind::ALL
            .into_iter()
            .map(|kind| self.ledger_mut(kind).backfill_synced_at())
            .sum();
        if stamped > 0 {
            self.touch(clock);
        }
        stamped
    }

    /// Records the version assigned by the repository after a write.
    pub(crate) const fn record_version(&mut self, version: JobVersion) {
        self.version = version;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
