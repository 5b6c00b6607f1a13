//! gRPC authentication interceptor.
//!
//! Authenticates the `authorization` metadata of every incoming call against
//! the active authenticator and attaches the verified [`Identity`] to the
//! request extensions.
//!
//! # Security
//!
//! - Every call requires a credential
//! - Error messages are the fixed `AuthError` strings; no token content
//! - `MissingScope` returns PERMISSION_DENIED, all other failures
//!   UNAUTHENTICATED

use crate::observability::metrics::{record_auth_result, record_missing_credentials};
use crate::reload::AuthenticatorHandle;
use gate_core::{AuthError, Identity};
use std::time::Instant;
use tonic::{service::Interceptor, Request, Status};
use tracing::instrument;

/// gRPC authentication interceptor backed by the gate authenticator.
#[derive(Clone, Debug)]
pub struct GateAuthInterceptor {
    authenticator: AuthenticatorHandle,
}

impl GateAuthInterceptor {
    /// Create an interceptor that reads the active authenticator from `handle`.
    #[must_use]
    pub fn new(authenticator: AuthenticatorHandle) -> Self {
        Self { authenticator }
    }
}

fn to_status(err: AuthError) -> Status {
    if err.is_forbidden() {
        Status::permission_denied(err.to_string())
    } else {
        Status::unauthenticated(err.to_string())
    }
}

impl Interceptor for GateAuthInterceptor {
    #[instrument(skip_all, name = "gate.grpc.auth_interceptor")]
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let Some(auth_header) = request.metadata().get("authorization") else {
            tracing::debug!(target: "gate.grpc.auth", "Missing authorization metadata");
            record_missing_credentials("grpc");
            return Err(Status::unauthenticated("Missing authorization header"));
        };

        let start = Instant::now();
        let result = match auth_header.to_str() {
            Ok(credential) => self.authenticator.current().authenticate(credential),
            Err(_) => {
                tracing::debug!(target: "gate.grpc.auth", "Authorization metadata is not ASCII");
                Err(AuthError::MalformedToken)
            }
        };
        record_auth_result("grpc", &result, start.elapsed());

        let identity: Identity = result.map_err(|e| {
            tracing::debug!(target: "gate.grpc.auth", error = e.kind(), "Call rejected");
            to_status(e)
        })?;

        request.extensions_mut().insert(identity);
        Ok(request)
    }
}
