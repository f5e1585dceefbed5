//! Port contracts for job workflow management.
//!
//! Ports define infrastructure-agnostic interfaces used by job services.

pub mod ids;
pub mod repository;

pub use ids::{NoteIdGenerator, RandomNoteIds};
pub use repository::{JobRepository, JobRepositoryError, JobRepositoryResult};
