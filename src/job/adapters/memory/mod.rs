//! In-memory adapters for job persistence.

mod job;

pub use job::InMemoryJobRepository;
