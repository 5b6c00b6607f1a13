//! Observability module for the gate service.
//!
//! Provides metrics definitions and recording helpers.

pub mod metrics;
