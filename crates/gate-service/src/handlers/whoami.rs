//! Current caller endpoint.
//!
//! Echoes the verified subject back to the caller; stands in for the
//! downstream authorization layer that would consume the `Identity`.

use crate::errors::GateError;
use axum::{Extension, Json};
use gate_core::Identity;
use serde::Serialize;
use tracing::instrument;

/// Response body for `GET /api/v1/whoami`.
#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    /// The token's `sub` claim.
    pub subject_id: String,
}

/// Handler for GET /api/v1/whoami
///
/// Requires `require_auth`; the identity comes from request extensions.
#[instrument(skip_all, name = "gate.whoami")]
pub async fn whoami(
    identity: Option<Extension<Identity>>,
) -> Result<Json<WhoAmIResponse>, GateError> {
    let Some(Extension(identity)) = identity else {
        // Route registered without the auth layer
        tracing::error!(target: "gate.whoami", "Identity missing from request extensions");
        return Err(GateError::Internal);
    };

    Ok(Json(WhoAmIResponse {
        subject_id: identity.into_subject_id(),
    }))
}
