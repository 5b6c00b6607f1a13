//! Token Gate Service Library
//!
//! Puts the `gate_core` authenticator in front of HTTP and gRPC traffic:
//!
//! - Provider configuration and JWKS loading
//! - Atomic authenticator swap on reload (SIGHUP)
//! - Axum `require_auth` middleware and tonic `GateAuthInterceptor`
//! - Health, readiness and Prometheus endpoints
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `grpc` - tonic interceptor
//! - `handlers` - HTTP request handlers
//! - `middleware` - Authentication and HTTP metrics middleware
//! - `observability` - Metrics definitions
//! - `providers` - Provider file loading
//! - `reload` - Swappable authenticator handle
//! - `routes` - Axum router setup

pub mod config;
pub mod errors;
pub mod grpc;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod providers;
pub mod reload;
pub mod routes;
