//! Domain model for job workflow progression.
//!
//! The job domain models the stage pipeline, per-stage step checklists, the
//! stage audit trail, coarse status and the three note ledgers while keeping
//! all infrastructure concerns outside of the domain boundary.

mod error;
mod ids;
mod job;
mod note;
mod stage;
mod status;

pub use error::{JobDomainError, ParseJobValueError};
pub use ids::{JobId, JobNumber, JobVersion, NoteId};
pub use job::{Job, PersistedJobData};
pub use note::{LedgerKind, NewNote, Note, NoteLedger, NoteStatus};
pub use stage::{
    Stage, StageDefinition, StageHistory, StageHistoryEntry, StageProgress, StageSteps,
    StageTable, StepDefinition,
};
pub use status::{JobStatus, ProposalStatus, UnifiedStatus};
