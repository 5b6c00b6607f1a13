//! Multi-provider token authentication.
//!
//! [`TokenAuthenticator`] owns an ordered list of [`TrustAnchor`]s and turns a
//! presented credential into an [`Identity`] or an [`AuthError`].
//!
//! Resolution runs in two phases that are kept apart:
//!
//! 1. [`resolve_anchor`] walks the anchors in registration order and stops at
//!    the first one holding a key that verifies the signature. Anchors that
//!    cannot verify are skipped without error.
//! 2. [`validate_claims`] checks the claims against that anchor only. Its
//!    failures are final; no later anchor is consulted.
//!
//! If phase 1 finds nothing the result is [`AuthError::NoMatchingProvider`].

use crate::anchor::TrustAnchor;
use crate::claims::{has_required_scopes, TokenClaims};
use crate::errors::{AuthError, SetupError};
use crate::jwt::{self, ParsedToken, DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use std::fmt;
use std::time::Duration;
use tracing::instrument;

/// A verified caller.
///
/// Carries only the subject; nothing refers back to the token or the key that
/// verified it. Debug output redacts the subject.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    subject_id: String,
}

impl Identity {
    /// Wrap a verified subject.
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
        }
    }

    /// The token's `sub` claim.
    #[must_use]
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Consume the identity, returning the subject.
    #[must_use]
    pub fn into_subject_id(self) -> String {
        self.subject_id
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("subject_id", &"[REDACTED]")
            .finish()
    }
}

/// Outcome of the signature phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorMatch<'a> {
    /// The anchor at `anchor_index` verified the signature with key `kid`.
    Matched {
        /// Position in registration order.
        anchor_index: usize,
        /// Key that verified the signature.
        kid: &'a str,
    },
    /// No anchor holds a key that verifies the signature.
    Unmatched,
}

/// Find the first anchor, in order, whose keys verify `token`'s signature.
#[must_use]
pub fn resolve_anchor<'a>(anchors: &'a [TrustAnchor], token: &ParsedToken) -> AnchorMatch<'a> {
    anchors
        .iter()
        .enumerate()
        .find_map(|(anchor_index, anchor)| {
            anchor
                .verifying_kid(token)
                .map(|kid| AnchorMatch::Matched { anchor_index, kid })
        })
        .unwrap_or(AnchorMatch::Unmatched)
}

/// Check `claims` against the anchor that verified the signature.
///
/// Checks run in a fixed order and the first failure is returned:
/// issuer, audience, not-before, expiry, subject, scopes. `now` is Unix
/// seconds; `nbf` and `exp` are each widened by `clock_skew`. A claim with
/// the wrong JSON type fails the check that reads it.
///
/// # Errors
///
/// The [`AuthError`] claim variant for the first check that fails.
pub fn validate_claims(
    anchor: &TrustAnchor,
    claims: &TokenClaims,
    now: i64,
    clock_skew: Duration,
) -> Result<Identity, AuthError> {
    let skew = i64::try_from(clock_skew.as_secs()).unwrap_or(i64::MAX);

    if claims.iss.as_deref() != Some(anchor.issuer()) {
        return Err(AuthError::InvalidIssuer);
    }

    if !claims
        .aud
        .as_ref()
        .is_some_and(|aud| aud.contains(anchor.audience()))
    {
        return Err(AuthError::InvalidAudience);
    }

    // A time claim that is present but not a number fails its check.
    if let Some(nbf) = claims.nbf {
        if !nbf
            .seconds()
            .is_some_and(|nbf| now >= nbf.saturating_sub(skew))
        {
            return Err(AuthError::NotYetValid);
        }
    }

    if let Some(exp) = claims.exp {
        if !exp
            .seconds()
            .is_some_and(|exp| now < exp.saturating_add(skew))
        {
            return Err(AuthError::TokenExpired);
        }
    }

    let subject = claims.subject().ok_or(AuthError::MissingSubject)?;

    if !has_required_scopes(&claims.scopes(), anchor.required_scopes()) {
        return Err(AuthError::MissingScope);
    }

    Ok(Identity::new(subject))
}

/// Authenticates bearer tokens against an ordered list of trust anchors.
///
/// Immutable once built. Share it behind an `Arc`; to rotate keys build a new
/// authenticator and swap the reference.
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    anchors: Vec<TrustAnchor>,
    clock_skew: Duration,
}

impl TokenAuthenticator {
    /// Build an authenticator with [`DEFAULT_CLOCK_SKEW`].
    ///
    /// Anchors are evaluated in the order given.
    #[must_use]
    pub fn new(anchors: Vec<TrustAnchor>) -> Self {
        Self {
            anchors,
            clock_skew: DEFAULT_CLOCK_SKEW,
        }
    }

    /// Build an authenticator with a custom clock-skew tolerance.
    ///
    /// # Errors
    ///
    /// [`SetupError::ClockSkewTooLarge`] if `clock_skew` exceeds
    /// [`MAX_CLOCK_SKEW`].
    pub fn with_clock_skew(
        anchors: Vec<TrustAnchor>,
        clock_skew: Duration,
    ) -> Result<Self, SetupError> {
        if clock_skew > MAX_CLOCK_SKEW {
            return Err(SetupError::ClockSkewTooLarge {
                requested: clock_skew,
                max: MAX_CLOCK_SKEW,
            });
        }
        Ok(Self {
            anchors,
            clock_skew,
        })
    }

    /// Registered anchors, in evaluation order.
    #[must_use]
    pub fn anchors(&self) -> &[TrustAnchor] {
        &self.anchors
    }

    /// Number of registered anchors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// True when no anchors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Clock-skew tolerance applied to `nbf` and `exp`.
    #[must_use]
    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    /// Authenticate a credential against the current wall clock.
    ///
    /// `credential` is either a bare compact token or `Bearer <token>`.
    ///
    /// # Errors
    ///
    /// See [`TokenAuthenticator::authenticate_at`].
    pub fn authenticate(&self, credential: &str) -> Result<Identity, AuthError> {
        self.authenticate_at(credential, chrono::Utc::now().timestamp())
    }

    /// Authenticate a credential as of `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// - `MalformedToken` if the credential cannot be parsed; no anchor is tried
    /// - `NoMatchingProvider` if no anchor's keys verify the signature
    /// - a claim variant if the committed anchor rejects the claims
    #[instrument(skip_all, fields(anchors = self.anchors.len()))]
    pub fn authenticate_at(&self, credential: &str, now: i64) -> Result<Identity, AuthError> {
        let token = jwt::parse(jwt::strip_bearer(credential)?)?;

        let AnchorMatch::Matched { anchor_index, kid } = resolve_anchor(&self.anchors, &token)
        else {
            tracing::debug!(
                target: "gate.auth",
                alg = ?token.header.alg,
                has_kid = token.header.kid.is_some(),
                "Token rejected: no anchor verified the signature"
            );
            return Err(AuthError::NoMatchingProvider);
        };

        // Index came from enumerating the same slice.
        let Some(anchor) = self.anchors.get(anchor_index) else {
            return Err(AuthError::NoMatchingProvider);
        };

        match validate_claims(anchor, &token.claims, now, self.clock_skew) {
            Ok(identity) => {
                tracing::debug!(
                    target: "gate.auth",
                    issuer = %anchor.issuer(),
                    anchor_index,
                    kid = %kid,
                    "Token authenticated"
                );
                Ok(identity)
            }
            Err(e) => {
                tracing::debug!(
                    target: "gate.auth",
                    issuer = %anchor.issuer(),
                    anchor_index,
                    kid = %kid,
                    error = e.kind(),
                    "Token rejected by committed anchor"
                );
                Err(e)
            }
        }
    }
}
