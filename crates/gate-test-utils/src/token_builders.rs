//! Builder patterns for test data construction
//!
//! Provides a fluent API for creating signed test tokens.

use crate::crypto_fixtures::TestKeypair;
use crate::test_ids::{SCOPE_AUTHZED, TEST_AUDIENCE, TEST_ISSUER, TEST_SUBJECT};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Which `kid` to write into the token header.
#[derive(Debug, Clone)]
enum KidChoice {
    FromKeypair,
    Explicit(String),
    Omitted,
}

/// Builder for creating signed test JWTs
///
/// Defaults produce a token valid for one hour under the standard test
/// provider (`TEST_ISSUER`, `TEST_AUDIENCE`, scope `authzed`).
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_subject("alice")
///     .with_scope("authzed read")
///     .expires_in(3600)
///     .sign(&keypair);
/// ```
#[derive(Debug, Clone)]
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
    kid: KidChoice,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    pub fn new() -> Self {
        let now = Utc::now();
        let mut claims = Map::new();
        claims.insert("iss".to_string(), json!(TEST_ISSUER));
        claims.insert("aud".to_string(), json!(TEST_AUDIENCE));
        claims.insert("sub".to_string(), json!(TEST_SUBJECT));
        claims.insert("scope".to_string(), json!(SCOPE_AUTHZED));
        claims.insert("iat".to_string(), json!(now.timestamp()));
        claims.insert(
            "exp".to_string(),
            json!((now + Duration::seconds(3600)).timestamp()),
        );
        Self {
            claims,
            kid: KidChoice::FromKeypair,
        }
    }

    /// Set the subject
    pub fn for_subject(self, subject: &str) -> Self {
        self.with_claim("sub", json!(subject))
    }

    /// Set the issuer
    pub fn with_issuer(self, issuer: &str) -> Self {
        self.with_claim("iss", json!(issuer))
    }

    /// Set a single-string audience
    pub fn with_audience(self, audience: &str) -> Self {
        self.with_claim("aud", json!(audience))
    }

    /// Set a list audience
    pub fn with_audiences(self, audiences: &[&str]) -> Self {
        self.with_claim("aud", json!(audiences))
    }

    /// Set the scope (space-separated)
    pub fn with_scope(self, scope: &str) -> Self {
        self.with_claim("scope", json!(scope))
    }

    /// Set expiration in seconds from now
    pub fn expires_in(self, seconds: i64) -> Self {
        let exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self.with_claim("exp", json!(exp))
    }

    /// Set expiration timestamp
    pub fn expires_at(self, timestamp: i64) -> Self {
        self.with_claim("exp", json!(timestamp))
    }

    /// Set not-before timestamp
    pub fn not_before(self, timestamp: i64) -> Self {
        self.with_claim("nbf", json!(timestamp))
    }

    /// Set issued-at timestamp
    pub fn issued_at(self, timestamp: i64) -> Self {
        self.with_claim("iat", json!(timestamp))
    }

    /// Set any claim to any JSON value
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Remove a claim entirely
    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// Write this `kid` into the header instead of the signing key's
    pub fn with_kid(mut self, kid: &str) -> Self {
        self.kid = KidChoice::Explicit(kid.to_string());
        self
    }

    /// Leave `kid` out of the header
    pub fn without_kid(mut self) -> Self {
        self.kid = KidChoice::Omitted;
        self
    }

    /// Build the claims as a JSON value
    pub fn build(&self) -> Value {
        Value::Object(self.claims.clone())
    }

    /// Sign the claims with `keypair` (EdDSA) and return the compact token
    pub fn sign(&self, keypair: &TestKeypair) -> String {
        let encoding_key = EncodingKey::from_ed_der(&keypair.private_key_pkcs8);
        let mut header = Header::new(Algorithm::EdDSA);
        header.typ = Some("JWT".to_string());
        header.kid = match &self.kid {
            KidChoice::FromKeypair => Some(keypair.kid.clone()),
            KidChoice::Explicit(kid) => Some(kid.clone()),
            KidChoice::Omitted => None,
        };

        encode(&header, &self.build(), &encoding_key).expect("Failed to sign token")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    fn header_of(token: &str) -> Value {
        let header = token.split('.').next().unwrap();
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header).unwrap()).unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let claims = TestTokenBuilder::default().build();
        assert_eq!(claims["sub"], TEST_SUBJECT);
        assert_eq!(claims["iss"], TEST_ISSUER);
        assert_eq!(claims["aud"], TEST_AUDIENCE);
        assert!(claims["exp"].as_i64().unwrap() > Utc::now().timestamp());
    }

    #[test]
    fn test_builder_overrides() {
        let claims = TestTokenBuilder::new()
            .for_subject("alice")
            .with_audiences(&["a", "b"])
            .not_before(10)
            .without_claim("scope")
            .build();
        assert_eq!(claims["sub"], "alice");
        assert_eq!(claims["aud"], json!(["a", "b"]));
        assert_eq!(claims["nbf"], 10);
        assert!(claims.get("scope").is_none());
    }

    #[test]
    fn test_sign_uses_keypair_kid() {
        let keypair = TestKeypair::new(1, "key-01");
        let token = TestTokenBuilder::new().sign(&keypair);
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(header_of(&token)["kid"], "key-01");
        assert_eq!(header_of(&token)["alg"], "EdDSA");
    }

    #[test]
    fn test_sign_kid_choices() {
        let keypair = TestKeypair::new(1, "key-01");
        let explicit = TestTokenBuilder::new().with_kid("other").sign(&keypair);
        assert_eq!(header_of(&explicit)["kid"], "other");

        let omitted = TestTokenBuilder::new().without_kid().sign(&keypair);
        assert!(header_of(&omitted).get("kid").is_none());
    }
}
