//! gRPC integration for the gate.
//!
//! Wrap any tonic service with [`GateAuthInterceptor`] to require a verified
//! identity on every call:
//!
//! ```rust,ignore
//! let interceptor = GateAuthInterceptor::new(handle.clone());
//! Server::builder()
//!     .add_service(MyServiceServer::with_interceptor(service, interceptor))
//! ```

pub mod auth_interceptor;

pub use auth_interceptor::GateAuthInterceptor;
