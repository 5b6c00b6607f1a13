//! Error types for the token gate.
//!
//! [`AuthError`] is the per-request taxonomy returned by
//! [`TokenAuthenticator::authenticate`](crate::TokenAuthenticator::authenticate).
//! The remaining types describe construction-time failures (bad key material,
//! bad authenticator settings) and never surface on the request path.
//!
//! Display strings are short and fixed. No variant carries token content,
//! claim values, or key bytes.

use std::time::Duration;
use thiserror::Error;

/// Why a presented token was rejected.
///
/// The first two variants are decided before any trust anchor commits to the
/// token. The rest are claim failures under the anchor whose key verified the
/// signature, and are final for the request.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthError {
    /// Structurally invalid input: wrong segment count, undecodable segment,
    /// non-object header or payload, oversized token, bad `Bearer` prefix.
    #[error("malformed token")]
    MalformedToken,

    /// No configured anchor holds a key that verifies the signature.
    #[error("token was not issued by a trusted provider")]
    NoMatchingProvider,

    /// `iss` does not equal the committed anchor's issuer.
    #[error("token issuer is not accepted")]
    InvalidIssuer,

    /// `aud` does not contain the committed anchor's audience.
    #[error("token audience is not accepted")]
    InvalidAudience,

    /// `nbf` lies in the future beyond the clock-skew tolerance.
    #[error("token is not yet valid")]
    NotYetValid,

    /// `exp` lies in the past beyond the clock-skew tolerance.
    #[error("token has expired")]
    TokenExpired,

    /// `sub` is absent or empty.
    #[error("token has no subject")]
    MissingSubject,

    /// The token's scopes do not cover the anchor's required scopes.
    #[error("token is missing a required scope")]
    MissingScope,
}

impl AuthError {
    /// Stable snake_case label, used for log fields and metric labels.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MalformedToken => "malformed_token",
            AuthError::NoMatchingProvider => "no_matching_provider",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::InvalidAudience => "invalid_audience",
            AuthError::NotYetValid => "not_yet_valid",
            AuthError::TokenExpired => "token_expired",
            AuthError::MissingSubject => "missing_subject",
            AuthError::MissingScope => "missing_scope",
        }
    }

    /// True when the caller is authenticated but not permitted.
    ///
    /// Only a scope shortfall qualifies: the token was issued by a trusted
    /// provider for this audience and is in date, it just grants too little.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::MissingScope)
    }
}

/// Errors raised while turning provider key material into a [`KeySet`](crate::KeySet).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterialError {
    /// The JWKS document is not valid JSON or not shaped like `{"keys":[...]}`.
    #[error("JWKS document is malformed: {0}")]
    MalformedDocument(String),

    /// A key's parameters could not be turned into a verification key.
    #[error("key '{kid}' is invalid: {reason}")]
    InvalidKey {
        /// Key identifier of the offending key.
        kid: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Two keys in the same set share a `kid`.
    #[error("duplicate key id '{0}'")]
    DuplicateKid(String),

    /// The document contained no key usable for signature verification.
    #[error("no usable signing keys")]
    NoUsableKeys,
}

/// Errors raised while constructing a [`TokenAuthenticator`](crate::TokenAuthenticator).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// Requested clock-skew tolerance exceeds [`MAX_CLOCK_SKEW`](crate::jwt::MAX_CLOCK_SKEW).
    #[error("clock skew tolerance {requested:?} exceeds maximum {max:?}")]
    ClockSkewTooLarge {
        /// Tolerance that was asked for.
        requested: Duration,
        /// Largest tolerance allowed.
        max: Duration,
    },
}
