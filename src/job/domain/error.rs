//! Error types for job domain validation and parsing.

use super::{JobId, NoteId, Stage};
use thiserror::Error;

/// Errors returned by job aggregate operations.
///
/// All variants are validation failures: retrying the same call against the
/// same job state yields the same error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobDomainError {
    /// The step key is not a required step of the job's current stage.
    #[error("step '{step}' is not a required step of stage '{stage}' on job {job_id}")]
    InvalidStep {
        /// Job the step was applied to.
        job_id: JobId,
        /// Stage the job was in when the step was rejected.
        stage: Stage,
        /// Rejected step key.
        step: String,
    },

    /// No ledger on the job contains the note.
    #[error("note {note_id} not found on job {job_id}")]
    NoteNotFound {
        /// Job whose ledgers were searched.
        job_id: JobId,
        /// Missing note identifier.
        note_id: NoteId,
    },

    /// The note identifier is already used in the ledger.
    #[error("note {0} already exists in the ledger")]
    DuplicateNoteId(NoteId),

    /// The note text is empty after trimming.
    #[error("note text must not be empty")]
    EmptyNoteText,

    /// The service address is empty after trimming.
    #[error("service address must not be empty")]
    EmptyServiceAddress,

    /// The job number could not be parsed or is out of range.
    #[error("invalid job number '{0}', expected YYYYMMDD-NNN")]
    InvalidJobNumber(String),
}

/// Error returned while parsing enumerated job values from persistence or
/// caller input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseJobValueError {
    /// Unknown stage key.
    #[error("unknown stage: {0}")]
    Stage(String),
    /// Unknown coarse job status.
    #[error("unknown job status: {0}")]
    Status(String),
    /// Unknown note status.
    #[error("unknown note status: {0}")]
    NoteStatus(String),
    /// Unknown ledger name.
    #[error("unknown note ledger: {0}")]
    Ledger(String),
    /// Unknown proposal status.
    #[error("unknown proposal status: {0}")]
    ProposalStatus(String),
}
