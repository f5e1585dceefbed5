//! Adapter implementations for intake persistence ports.

pub mod memory;
pub mod postgres;
