//! Jobflow: job stage progression and field-submission intake for HVAC
//! service work.
//!
//! The crate tracks installation jobs through a fixed construction pipeline
//! and reconciles field-technician form submissions against those jobs.
//!
//! # Architecture
//!
//! Jobflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`job`]: Stage pipeline, step checklists, note ledgers and job storage
//! - [`intake`]: Address matching, answer extraction and submission ingestion
//! - [`config`]: Environment-driven configuration
//! - [`telemetry`]: Log subscriber setup
//! - [`clock`]: Controllable clock for deterministic timestamps

pub mod clock;
pub mod config;
pub mod intake;
pub mod job;
pub mod telemetry;
