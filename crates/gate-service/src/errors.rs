//! Gate service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. Messages
//! returned to clients are the fixed `AuthError` display strings, which carry
//! no token content.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use gate_core::AuthError;
use serde::Serialize;
use thiserror::Error;

/// Realm advertised in `WWW-Authenticate` challenges.
pub const AUTH_REALM: &str = "token-gate";

/// Gate service error type.
///
/// Maps to HTTP status codes:
/// - MissingCredentials, InvalidToken: 401 Unauthorized
/// - InsufficientScope: 403 Forbidden
/// - Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(AuthError),

    #[error("Insufficient scope: {0}")]
    InsufficientScope(AuthError),

    #[error("Internal server error")]
    Internal,
}

impl From<AuthError> for GateError {
    fn from(err: AuthError) -> Self {
        if err.is_forbidden() {
            GateError::InsufficientScope(err)
        } else {
            GateError::InvalidToken(err)
        }
    }
}

impl GateError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GateError::MissingCredentials | GateError::InvalidToken(_) => 401,
            GateError::InsufficientScope(_) => 403,
            GateError::Internal => 500,
        }
    }

    /// Bearer challenge for this error (RFC 6750 section 3), if any.
    fn challenge(&self) -> Option<String> {
        match self {
            GateError::MissingCredentials => Some(format!("Bearer realm=\"{AUTH_REALM}\"")),
            GateError::InvalidToken(_) => Some(format!(
                "Bearer realm=\"{AUTH_REALM}\", error=\"invalid_token\""
            )),
            GateError::InsufficientScope(_) => Some(format!(
                "Bearer realm=\"{AUTH_REALM}\", error=\"insufficient_scope\""
            )),
            GateError::Internal => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            GateError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "MISSING_CREDENTIALS",
                "Authorization header is required".to_string(),
            ),
            GateError::InvalidToken(err) => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", err.to_string())
            }
            GateError::InsufficientScope(err) => {
                (StatusCode::FORBIDDEN, "INSUFFICIENT_SCOPE", err.to_string())
            }
            GateError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let challenge = self.challenge();
        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        if let Some(header_value) = challenge.and_then(|c| HeaderValue::from_str(&c).ok()) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, header_value);
        }

        response
    }
}
