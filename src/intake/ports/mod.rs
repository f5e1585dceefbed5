//! Port contracts for submission intake.

pub mod repository;

pub use repository::{
    IntakeRepositoryError, IntakeRepositoryResult, MaterialRepository, SubmissionRepository,
};
