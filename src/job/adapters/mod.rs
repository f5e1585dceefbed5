//! Adapter implementations for job persistence ports.

pub mod memory;
pub mod postgres;
