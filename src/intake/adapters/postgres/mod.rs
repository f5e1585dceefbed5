//! `PostgreSQL` adapters for intake persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresMaterialRepository, PostgresSubmissionRepository};
