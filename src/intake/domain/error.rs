//! Validation errors for intake records.

use thiserror::Error;

/// Errors returned when building intake records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntakeDomainError {
    /// The external submission identifier is blank.
    #[error("submission identifier must not be empty")]
    EmptySubmissionId,

    /// The material description is blank or a placeholder.
    #[error("material description must not be empty")]
    EmptyMaterialDescription,
}
