//! Multi-provider bearer-token authentication.
//!
//! Given a credential from an inbound request, decides whether one of several
//! independently configured identity providers issued it and, if so, returns
//! the verified subject.
//!
//! ```rust,ignore
//! let keys = KeySet::from_jwks_json(&jwks_bytes)?;
//! let anchor = TrustAnchor::new("https://idp.example.com", "example.com", ["authzed"], keys);
//! let authenticator = TokenAuthenticator::new(vec![anchor]);
//!
//! match authenticator.authenticate(header_value) {
//!     Ok(identity) => println!("hello {}", identity.subject_id()),
//!     Err(e) if e.is_forbidden() => { /* 403 */ }
//!     Err(_) => { /* 401 */ }
//! }
//! ```
//!
//! The crate performs no I/O. Key material arrives already resolved; rotation
//! means building a new [`TokenAuthenticator`] and swapping it in.

#![warn(clippy::pedantic)]

/// Module for trust anchors (one configured identity provider each)
pub mod anchor;

/// Module for the resolution algorithm and verified identities
pub mod authenticator;

/// Module for claim types and scope matching
pub mod claims;

/// Module for error types
pub mod errors;

/// Module for JWKS to key-set conversion
pub mod jwks;

/// Module for token parsing and size/skew constants
pub mod jwt;

/// Module for verification keys and key sets
pub mod keys;

pub use anchor::TrustAnchor;
pub use authenticator::{resolve_anchor, validate_claims, AnchorMatch, Identity, TokenAuthenticator};
pub use claims::{has_required_scopes, Audience, NumericDate, ScopeClaim, TokenClaims};
pub use errors::{AuthError, KeyMaterialError, SetupError};
pub use jwks::{Jwk, JwksDocument};
pub use jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW, MAX_JWT_SIZE_BYTES};
pub use keys::{KeySet, VerificationKey};
