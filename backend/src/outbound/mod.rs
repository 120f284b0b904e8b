//! Outbound adapters implementing the driven ports.
//!
//! - `persistence`: PostgreSQL repositories via Diesel.
//! - `memory`: process-local repositories for development and tests.

pub mod memory;
pub mod persistence;
