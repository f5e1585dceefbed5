//! Application services for submission intake.

mod error;
mod ingestion;
mod resolver;

pub use error::{IntakeServiceError, IntakeServiceResult};
pub use ingestion::{
    DEFAULT_NOTE_AUTHOR, IngestionFailure, IngestionSummary, SubmissionIngestionService,
};
pub use resolver::ExistingJobResolver;
