//! Service layer for the per-job note ledgers.

use super::{JobServiceError, JobServiceResult, JobWriter, WriteRetryConfig};
use crate::job::{
    domain::{JobId, LedgerKind, NewNote, Note, NoteId, NoteStatus},
    ports::{JobRepository, NoteIdGenerator},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Request payload for appending a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendNoteRequest {
    /// Job receiving the note.
    pub job_id: JobId,
    /// Ledger receiving the note.
    pub ledger: LedgerKind,
    /// Note text.
    pub text: String,
    /// Author of the note.
    pub author: String,
}

impl AppendNoteRequest {
    /// Creates an append request.
    #[must_use]
    pub fn new(
        job_id: JobId,
        ledger: LedgerKind,
        text: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            job_id,
            ledger,
            text: text.into(),
            author: author.into(),
        }
    }
}

/// A note together with the job and ledger that own it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedNote {
    /// Owning job.
    pub job_id: JobId,
    /// Owning ledger.
    pub ledger: LedgerKind,
    /// The note after the operation.
    pub note: Note,
}

/// Note ledger orchestration service.
pub struct NoteLedgerService<R, C>
where
    R: JobRepository,
    C: Clock + Send + Sync,
{
    writer: JobWriter<R>,
    clock: Arc<C>,
    ids: Arc<dyn NoteIdGenerator>,
}

impl<R, C> NoteLedgerService<R, C>
where
    R: JobRepository,
    C: Clock + Send + Sync,
{
    /// Creates a ledger service with the default retry policy.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>, ids: Arc<dyn NoteIdGenerator>) -> Self {
        Self::with_config(repository, clock, ids, WriteRetryConfig::default())
    }

    /// Creates a ledger service with a custom retry policy.
    #[must_use]
    pub fn with_config(
        repository: Arc<R>,
        clock: Arc<C>,
        ids: Arc<dyn NoteIdGenerator>,
        config: WriteRetryConfig,
    ) -> Self {
        Self {
            writer: JobWriter::new(repository, config),
            clock,
            ids,
        }
    }

    /// Appends an `undone` note to one of the job's ledgers.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError::Domain`] for blank text,
    /// [`JobServiceError::NotFound`] for a missing job, or persistence errors.
    pub async fn append_note(&self, request: AppendNoteRequest) -> JobServiceResult<LocatedNote> {
        let clock = &*self.clock;
        let note_id = self.ids.next_note_id();
        let AppendNoteRequest {
            job_id,
            ledger,
            text,
            author,
        } = request;

        let (_, note) = self
            .writer
            .mutate(job_id, |job| {
                job.append_note(ledger, NewNote::new(note_id, text.clone(), author.clone()), clock)
            })
            .await?;
        debug!(job_id = %job_id, note_id = %note.id, ledger = %ledger, "note appended");
        Ok(LocatedNote {
            job_id,
            ledger,
            note,
        })
    }

    /// Sets the status of a note, resolving its owning job via the note
    /// index.
    ///
    /// Only the matched note's status and `updated_at` change; every other
    /// entry keeps its content and position.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError::NoteNotFound`] when no job holds the note.
    pub async fn set_note_status(
        &self,
        note_id: NoteId,
        status: NoteStatus,
    ) -> JobServiceResult<LocatedNote> {
        let clock = &*self.clock;
        let job_id = self
            .writer
            .repository()
            .find_by_note_id(note_id)
            .await?
            .map(|job| job.id())
            .ok_or(JobServiceError::NoteNotFound(note_id))?;

        let (_, (ledger, note)) = self
            .writer
            .mutate(job_id, |job| job.set_note_status(note_id, status, clock))
            .await?;
        debug!(job_id = %job_id, note_id = %note_id, status = %status, "note status set");
        Ok(LocatedNote {
            job_id,
            ledger,
            note,
        })
    }

    /// Looks up a note by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError::NoteNotFound`] when no job holds the note.
    pub async fn find_note(&self, note_id: NoteId) -> JobServiceResult<LocatedNote> {
        let job = self
            .writer
            .repository()
            .find_by_note_id(note_id)
            .await?
            .ok_or(JobServiceError::NoteNotFound(note_id))?;
        let (ledger, note) = job
            .find_note(note_id)
            .ok_or(JobServiceError::NoteNotFound(note_id))?;
        Ok(LocatedNote {
            job_id: job.id(),
            ledger,
            note: note.clone(),
        })
    }

    /// Stamps `synced_at = created_at` on every note lacking it across all
    /// active jobs.
    ///
    /// Returns the number of notes stamped. Running it again returns zero.
    ///
    /// # Errors
    ///
    /// Returns [`JobServiceError`] when listing or writing fails.
    pub async fn backfill_synced_at(&self) -> JobServiceResult<usize> {
        let clock = &*self.clock;
        let jobs = self.writer.repository().list_active().await?;
        let mut stamped = 0_usize;
        for job in jobs {
            let (_, count) = self
                .writer
                .mutate(job.id(), |current| Ok(current.backfill_synced_at(clock)))
                .await?;
            stamped = stamped.saturating_add(count);
        }
        info!(stamped, "synced_at backfill finished");
        Ok(stamped)
    }
}
