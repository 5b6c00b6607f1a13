//! HTTP request handlers.

pub mod health;
pub mod metrics;
pub mod whoami;

pub use health::{health_check, readiness_check, ReadinessResponse};
pub use metrics::metrics_handler;
pub use whoami::{whoami, WhoAmIResponse};
