//! Field-form submission intake.
//!
//! Submissions from the field-form provider arrive with a raw address and a
//! list of answers. Intake stores them, matches each one to the most recent
//! active job at the same normalised address, and copies the extracted notes
//! and material requests onto that job. The module follows the same
//! hexagonal layout as [`crate::job`]:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
