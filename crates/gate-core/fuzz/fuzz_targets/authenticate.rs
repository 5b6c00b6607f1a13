#![no_main]

use gate_core::{AuthError, KeySet, TokenAuthenticator, TrustAnchor, VerificationKey};
use gate_test_utils::{TestKeypair, SCOPE_AUTHZED, TEST_AUDIENCE, TEST_ISSUER, TEST_NOW};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

fn authenticator() -> &'static TokenAuthenticator {
    static AUTHENTICATOR: OnceLock<TokenAuthenticator> = OnceLock::new();
    AUTHENTICATOR.get_or_init(|| {
        let keypair = TestKeypair::new(1, "fuzz-key");
        let key = VerificationKey::ed25519(&keypair.kid, &keypair.public_key_bytes)
            .expect("fixture key is 32 bytes");
        let keys = KeySet::new([(keypair.kid.clone(), key)]).expect("single key");
        TokenAuthenticator::new(vec![TrustAnchor::new(
            TEST_ISSUER,
            TEST_AUDIENCE,
            [SCOPE_AUTHZED],
            keys,
        )])
    })
}

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Random input cannot carry a valid Ed25519 signature, so nothing
        // past the signature phase is reachable.
        match authenticator().authenticate_at(input, TEST_NOW) {
            Err(AuthError::MalformedToken | AuthError::NoMatchingProvider) => {}
            other => panic!("unexpected outcome for fuzz input: {other:?}"),
        }
    }
});
