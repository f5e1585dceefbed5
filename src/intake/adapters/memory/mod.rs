//! In-memory adapters for intake persistence.

mod material;
mod submission;

pub use material::InMemoryMaterialRepository;
pub use submission::InMemorySubmissionRepository;
