//! Domain model for field-submission intake.
//!
//! Covers address canonicalisation, the raw answer format, extraction of
//! structured content from answers, and the stored submission and material
//! records.

mod address;
mod answer;
mod error;
mod material;
mod submission;
mod transform;

pub use address::{NormalizedAddress, normalize_address};
pub use answer::{AnswerValue, RawAnswer};
pub use error::IntakeDomainError;
pub use material::{MaterialEntry, MaterialId};
pub use submission::{
    IncomingSubmission, PersistedSubmissionData, Submission, SubmissionFilter, SubmissionId,
};
pub use transform::{QuestionMap, SubmissionTransformer, TransformedSubmission, meaningful};
