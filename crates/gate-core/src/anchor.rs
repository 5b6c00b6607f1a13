//! Trust anchors.
//!
//! A [`TrustAnchor`] is one independently configured identity provider: the
//! issuer it signs as, the audience its tokens must name, the scopes every
//! token must carry, and the public keys that verify its signatures. Anchors
//! are immutable; rotating keys means building a new anchor.

use crate::jwt::ParsedToken;
use crate::keys::KeySet;
use std::collections::BTreeSet;

/// One configured identity provider.
#[derive(Debug, Clone)]
pub struct TrustAnchor {
    issuer: String,
    audience: String,
    required_scopes: BTreeSet<String>,
    keys: KeySet,
}

impl TrustAnchor {
    /// Create an anchor.
    ///
    /// `required_scopes` may be empty, in which case any scope claim (or
    /// none) satisfies the anchor.
    pub fn new<I, S>(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        required_scopes: I,
        keys: KeySet,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            required_scopes: required_scopes.into_iter().map(Into::into).collect(),
            keys,
        }
    }

    /// Expected `iss`, compared exactly.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Audience the token's `aud` must contain.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Scopes every accepted token must carry.
    #[must_use]
    pub fn required_scopes(&self) -> &BTreeSet<String> {
        &self.required_scopes
    }

    /// The anchor's verification keys.
    #[must_use]
    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    /// Find the key that verifies `token`'s signature, returning its `kid`.
    ///
    /// With a `kid` in the header only that exact key is tried. Without one,
    /// every key is tried in `kid` order and the first that verifies wins.
    /// A header without `alg` verifies against nothing.
    #[must_use]
    pub fn verifying_kid(&self, token: &ParsedToken) -> Option<&str> {
        let alg = token.header.alg.as_deref()?;
        let message = token.signing_input();
        let signature = token.signature();

        match token.header.kid.as_deref() {
            Some(kid) => {
                let (kid, key) = self.keys.entry(kid)?;
                key.verifies(alg, message, signature).then_some(kid)
            }
            None => self
                .keys
                .iter()
                .find(|(_, key)| key.verifies(alg, message, signature))
                .map(|(kid, _)| kid),
        }
    }
}
