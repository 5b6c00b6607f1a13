//! Criterion benchmarks for TokenAuthenticator::authenticate_at()
//!
//! - Single anchor, token with kid
//! - Single anchor, token without kid (search every key)
//! - Fall-through: matching anchor registered last
//! - Rejection paths: malformed input, unknown key

#![allow(clippy::expect_used, clippy::indexing_slicing)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use gate_core::{KeySet, TokenAuthenticator, TrustAnchor, VerificationKey};
use gate_test_utils::{
    TestKeypair, TestTokenBuilder, SCOPE_AUTHZED, TEST_AUDIENCE, TEST_ISSUER, TEST_NOW,
};

// =============================================================================
// Fixtures
// =============================================================================

fn keypairs(count: u8, seed_offset: u8) -> Vec<TestKeypair> {
    (0..count)
        .map(|i| TestKeypair::new(seed_offset + i, &format!("bench-key-{seed_offset}-{i:02}")))
        .collect()
}

fn anchor(issuer: &str, keypairs: &[TestKeypair]) -> TrustAnchor {
    let keys = KeySet::new(keypairs.iter().map(|k| {
        (
            k.kid.clone(),
            VerificationKey::ed25519(&k.kid, &k.public_key_bytes).expect("valid fixture key"),
        )
    }))
    .expect("unique kids");
    TrustAnchor::new(issuer, TEST_AUDIENCE, [SCOPE_AUTHZED], keys)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_single_anchor(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_anchor");

    for key_count in [1u8, 4, 16] {
        let keys = keypairs(key_count, 1);
        let authenticator = TokenAuthenticator::new(vec![anchor(TEST_ISSUER, &keys)]);
        let signer = keys.last().expect("at least one key");

        let with_kid = TestTokenBuilder::new().sign(signer);
        group.bench_with_input(BenchmarkId::new("with_kid", key_count), &with_kid, |b, t| {
            b.iter(|| authenticator.authenticate_at(black_box(t), TEST_NOW));
        });

        let without_kid = TestTokenBuilder::new().without_kid().sign(signer);
        group.bench_with_input(
            BenchmarkId::new("without_kid", key_count),
            &without_kid,
            |b, t| {
                b.iter(|| authenticator.authenticate_at(black_box(t), TEST_NOW));
            },
        );
    }

    group.finish();
}

fn bench_fall_through(c: &mut Criterion) {
    let mut group = c.benchmark_group("fall_through");

    for anchor_count in [2u8, 8] {
        let mut anchors = Vec::new();
        let mut last_keys = Vec::new();
        for i in 0..anchor_count {
            let keys = keypairs(2, 10 + i * 2);
            anchors.push(anchor(&format!("https://idp-{i}.example.com"), &keys));
            last_keys = keys;
        }
        let issuer = format!("https://idp-{}.example.com", anchor_count - 1);
        let authenticator = TokenAuthenticator::new(anchors);
        let token = TestTokenBuilder::new()
            .with_issuer(&issuer)
            .sign(&last_keys[0]);

        group.bench_with_input(BenchmarkId::from_parameter(anchor_count), &token, |b, t| {
            b.iter(|| authenticator.authenticate_at(black_box(t), TEST_NOW));
        });
    }

    group.finish();
}

fn bench_rejections(c: &mut Criterion) {
    let keys = keypairs(4, 1);
    let authenticator = TokenAuthenticator::new(vec![anchor(TEST_ISSUER, &keys)]);
    let stranger = TestKeypair::new(200, "bench-key-1-00");
    let unknown = TestTokenBuilder::new().sign(&stranger);

    c.bench_function("reject_malformed", |b| {
        b.iter(|| authenticator.authenticate_at(black_box("not.a.token!"), TEST_NOW));
    });
    c.bench_function("reject_unknown_key", |b| {
        b.iter(|| authenticator.authenticate_at(black_box(&unknown), TEST_NOW));
    });
}

criterion_group!(benches, bench_single_anchor, bench_fall_through, bench_rejections);
criterion_main!(benches);
