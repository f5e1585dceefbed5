//! Application services for job workflow orchestration.

mod error;
mod notes;
mod progression;
mod registry;
mod writer;

pub use error::{JobServiceError, JobServiceResult};
pub use notes::{AppendNoteRequest, LocatedNote, NoteLedgerService};
pub use progression::StageProgressionService;
pub use registry::{CreateJobRequest, JobRegistryService};
pub use writer::{JobWriter, WriteRetryConfig};
