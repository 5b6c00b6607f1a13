//! Authentication middleware for protected routes.
//!
//! `require_auth` reads the `Authorization` header, hands the value to the
//! active [`TokenAuthenticator`](gate_core::TokenAuthenticator) (which strips
//! an optional `Bearer` prefix itself), and injects the resulting
//! [`Identity`] into request extensions.
//!
//! | Outcome                    | Status |
//! |----------------------------|--------|
//! | header missing             | 401    |
//! | `AuthError::MissingScope`  | 403    |
//! | any other `AuthError`      | 401    |

use crate::errors::GateError;
use crate::observability::metrics::{record_auth_result, record_missing_credentials};
use crate::reload::AuthenticatorHandle;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::IntoResponse,
};
use gate_core::{AuthError, Identity, TokenAuthenticator};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone, Debug)]
pub struct AuthState {
    /// Active authenticator, swapped on reload.
    pub authenticator: AuthenticatorHandle,
}

/// Authenticate the request's Authorization header and record the outcome.
///
/// A header that is not visible ASCII is treated as a malformed token.
fn authenticate_request(
    authenticator: &TokenAuthenticator,
    req: &Request,
) -> Result<Identity, GateError> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        tracing::debug!(target: "gate.middleware.auth", "Missing Authorization header");
        record_missing_credentials("http");
        return Err(GateError::MissingCredentials);
    };

    let start = Instant::now();
    let result = match header.to_str() {
        Ok(credential) => authenticator.authenticate(credential),
        Err(_) => {
            tracing::debug!(target: "gate.middleware.auth", "Authorization header is not ASCII");
            Err(AuthError::MalformedToken)
        }
    };
    record_auth_result("http", &result, start.elapsed());

    result.map_err(|e| {
        tracing::debug!(
            target: "gate.middleware.auth",
            error = e.kind(),
            "Request rejected"
        );
        GateError::from(e)
    })
}

/// Authentication middleware.
///
/// # Response
///
/// - Returns 401 Unauthorized if the credential is missing or invalid
/// - Returns 403 Forbidden if the token lacks a required scope
/// - Continues to next handler with `Identity` in extensions if valid
#[instrument(skip_all, name = "gate.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, GateError> {
    let authenticator = state.authenticator.current();
    let identity = authenticate_request(&authenticator, &req)?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Extension trait for extracting the verified identity from a request.
pub trait IdentityExt {
    /// Get the authenticated identity from request extensions.
    ///
    /// Returns `None` if auth middleware was not applied to this request.
    fn identity(&self) -> Option<&Identity>;
}

impl<B> IdentityExt for axum::http::Request<B> {
    fn identity(&self) -> Option<&Identity> {
        self.extensions().get::<Identity>()
    }
}
