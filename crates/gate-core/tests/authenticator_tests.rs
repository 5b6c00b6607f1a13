//! Authenticator integration tests.
//!
//! Builds anchors the way a deployment does (JWKS documents through
//! `KeySet::from_jwks_json`) and drives `TokenAuthenticator` through the
//! public API only.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use gate_core::{
    AuthError, KeySet, TokenAuthenticator, TrustAnchor, VerificationKey, DEFAULT_CLOCK_SKEW,
};
use gate_test_utils::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn anchor_from_jwks(issuer: &str, scopes: &[&str], keypairs: &[&TestKeypair]) -> TrustAnchor {
    let document = serde_json::to_vec(&jwks_json(keypairs)).unwrap();
    let keys = KeySet::from_jwks_json(&document).unwrap();
    TrustAnchor::new(issuer, TEST_AUDIENCE, scopes.iter().copied(), keys)
}

/// Two providers with disjoint keys, registered in order.
struct TwoProviders {
    corp: TestKeypair,
    partner: TestKeypair,
    authenticator: TokenAuthenticator,
}

impl TwoProviders {
    fn new() -> Self {
        let corp = TestKeypair::new(1, TEST_KEY_ID_1);
        let partner = TestKeypair::new(2, TEST_KEY_ID_2);
        let authenticator = TokenAuthenticator::new(vec![
            anchor_from_jwks(TEST_ISSUER, &[SCOPE_AUTHZED], &[&corp]),
            anchor_from_jwks(TEST_ISSUER_2, &[SCOPE_READ, SCOPE_WRITE], &[&partner]),
        ]);
        Self {
            corp,
            partner,
            authenticator,
        }
    }
}

#[test]
fn test_each_provider_accepts_its_own_tokens() {
    let providers = TwoProviders::new();

    let corp_token = TestTokenBuilder::new()
        .for_subject(TEST_SUBJECT_ALICE)
        .sign(&providers.corp);
    let identity = providers.authenticator.authenticate(&corp_token).unwrap();
    assert_eq!(identity.subject_id(), TEST_SUBJECT_ALICE);

    let partner_token = TestTokenBuilder::new()
        .with_issuer(TEST_ISSUER_2)
        .with_scope("read write")
        .for_subject(TEST_SUBJECT_MALLORY)
        .sign(&providers.partner);
    let identity = providers.authenticator.authenticate(&partner_token).unwrap();
    assert_eq!(identity.subject_id(), TEST_SUBJECT_MALLORY);
}

#[test]
fn test_required_scopes_are_per_provider() {
    let providers = TwoProviders::new();

    // authzed satisfies corp but not partner
    let token = TestTokenBuilder::new()
        .with_issuer(TEST_ISSUER_2)
        .with_scope(SCOPE_AUTHZED)
        .sign(&providers.partner);
    let err = providers.authenticator.authenticate(&token).unwrap_err();
    assert_eq!(err, AuthError::MissingScope);
    assert!(err.is_forbidden());
}

#[test]
fn test_issuer_cannot_be_borrowed_across_providers() {
    // partner signs a token claiming corp's issuer: partner's anchor commits
    // and rejects the issuer.
    let providers = TwoProviders::new();
    let token = TestTokenBuilder::new().sign(&providers.partner);
    assert_eq!(
        providers.authenticator.authenticate(&token),
        Err(AuthError::InvalidIssuer)
    );
}

#[test]
fn test_rejections_are_deterministic() {
    let providers = TwoProviders::new();
    let stranger = TestKeypair::new(77, TEST_KEY_ID_3);
    let inputs = [
        TestTokenBuilder::new().sign(&stranger),
        TestTokenBuilder::new().expires_at(DATE_2000_01_02).sign(&providers.corp),
        "garbage".to_string(),
    ];
    for input in &inputs {
        let first = providers.authenticator.authenticate_at(input, TEST_NOW);
        for _ in 0..3 {
            assert_eq!(providers.authenticator.authenticate_at(input, TEST_NOW), first);
        }
    }
}

#[test]
fn test_swapping_authenticator_rotates_keys() {
    let old_key = TestKeypair::new(1, TEST_KEY_ID_1);
    let new_key = TestKeypair::new(3, TEST_KEY_ID_3);
    let before = Arc::new(TokenAuthenticator::new(vec![anchor_from_jwks(
        TEST_ISSUER,
        &[SCOPE_AUTHZED],
        &[&old_key],
    )]));
    let after = Arc::new(TokenAuthenticator::new(vec![anchor_from_jwks(
        TEST_ISSUER,
        &[SCOPE_AUTHZED],
        &[&new_key],
    )]));

    let old_token = TestTokenBuilder::new().sign(&old_key);
    let new_token = TestTokenBuilder::new().sign(&new_key);

    assert!(before.authenticate(&old_token).is_ok());
    assert_eq!(
        before.authenticate(&new_token),
        Err(AuthError::NoMatchingProvider)
    );
    assert!(after.authenticate(&new_token).is_ok());
    assert_eq!(
        after.authenticate(&old_token),
        Err(AuthError::NoMatchingProvider)
    );
}

#[test]
fn test_concurrent_authentication() {
    let providers = Arc::new(TwoProviders::new());
    let token = TestTokenBuilder::new().sign(&providers.corp);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let providers = Arc::clone(&providers);
            let token = token.clone();
            std::thread::spawn(move || {
                (0..50)
                    .map(|_| providers.authenticator.authenticate(&token).is_ok())
                    .all(|ok| ok)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_pem_key_verifies_tokens() {
    let (pem, pkcs8) = test_signing_key(5).unwrap();
    let keypair = TestKeypair {
        kid: "pem-key".to_string(),
        public_key_bytes: Vec::new(),
        private_key_pkcs8: pkcs8,
    };
    let key = VerificationKey::from_pem("pem-key", jsonwebtoken::Algorithm::EdDSA, pem.as_bytes())
        .unwrap();
    let keys = KeySet::new([("pem-key".to_string(), key)]).unwrap();
    let authenticator =
        TokenAuthenticator::new(vec![TrustAnchor::new(TEST_ISSUER, TEST_AUDIENCE, [SCOPE_AUTHZED], keys)]);

    let token = TestTokenBuilder::new().sign(&keypair);
    assert!(authenticator.authenticate(&token).is_ok());
}

#[test]
fn test_skew_configuration_applies_to_expiry() {
    let key = TestKeypair::new(1, TEST_KEY_ID_1);
    let anchor = anchor_from_jwks(TEST_ISSUER, &[SCOPE_AUTHZED], &[&key]);
    let strict = TokenAuthenticator::with_clock_skew(vec![anchor.clone()], Duration::from_secs(1))
        .unwrap();
    let lenient = TokenAuthenticator::new(vec![anchor]);
    assert_eq!(lenient.clock_skew(), DEFAULT_CLOCK_SKEW);

    let token = TestTokenBuilder::new().expires_at(TEST_NOW - 30).sign(&key);
    assert_eq!(
        strict.authenticate_at(&token, TEST_NOW),
        Err(AuthError::TokenExpired)
    );
    assert!(lenient.authenticate_at(&token, TEST_NOW).is_ok());
}

#[test]
fn test_extra_claims_are_ignored() {
    let key = TestKeypair::new(1, TEST_KEY_ID_1);
    let authenticator =
        TokenAuthenticator::new(vec![anchor_from_jwks(TEST_ISSUER, &[SCOPE_AUTHZED], &[&key])]);
    let token = TestTokenBuilder::new()
        .with_claim("org_id", json!("acme"))
        .with_claim("roles", json!(["admin"]))
        .with_claim("nested", json!({"a": 1}))
        .sign(&key);
    assert!(authenticator.authenticate(&token).is_ok());
}
