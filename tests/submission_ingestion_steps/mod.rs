//! Step definitions for submission ingestion scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
