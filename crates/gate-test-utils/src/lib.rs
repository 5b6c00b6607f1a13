//! # Gate Test Utilities
//!
//! Shared test utilities for the token gate crates.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (seeded Ed25519 keypairs, JWK rendering)
//! - A token builder that signs real JWTs with fixture keys
//! - Tamper helpers for forging headers and payloads after signing
//! - Fixed test constants (issuers, audiences, scopes, dates)
//!
//! It deliberately does not depend on `gate-core`, so the core crate can use
//! it from its own unit tests without linking a second copy of itself.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gate_test_utils::*;
//!
//! let keypair = TestKeypair::new(1, TEST_KEY_ID_1);
//! let token = TestTokenBuilder::new()
//!     .for_subject("alice")
//!     .with_scope("authzed read")
//!     .sign(&keypair);
//! ```

pub mod crypto_fixtures;
pub mod tamper;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use crypto_fixtures::*;
pub use tamper::*;
pub use test_ids::*;
pub use token_builders::*;
