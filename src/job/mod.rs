//! Job workflow management.
//!
//! A job moves through a fixed, linear stage pipeline. Each stage declares
//! required steps; completing the last one advances the job automatically,
//! while supervisors may move a job to any stage by hand. Jobs also carry
//! three append-only note ledgers. The module follows hexagonal
//! architecture:
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
