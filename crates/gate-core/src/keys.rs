//! Public verification keys.
//!
//! A [`VerificationKey`] pairs one public key with the single JWS algorithm
//! it may verify. A [`KeySet`] is the immutable `kid -> key` mapping a trust
//! anchor owns. Neither type prints key material in Debug output.

use crate::errors::KeyMaterialError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{Algorithm, DecodingKey};
use std::collections::BTreeMap;
use std::fmt;

/// A public key bound to exactly one signature algorithm.
#[derive(Clone)]
pub struct VerificationKey {
    algorithm: Algorithm,
    key: DecodingKey,
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("algorithm", &self.algorithm)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl VerificationKey {
    /// Ed25519 key from its raw 32-byte public key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if `public_key` is not 32 bytes long.
    pub fn ed25519(kid: &str, public_key: &[u8]) -> Result<Self, KeyMaterialError> {
        if public_key.len() != 32 {
            return Err(invalid(
                kid,
                format!("Ed25519 public key must be 32 bytes, got {}", public_key.len()),
            ));
        }
        Ok(Self {
            algorithm: Algorithm::EdDSA,
            key: DecodingKey::from_ed_der(public_key),
        })
    }

    /// Ed25519 key from a JWK `x` parameter (base64url).
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if `x` is not valid base64url or does not decode
    /// to 32 bytes.
    pub fn from_okp_components(kid: &str, x: &str) -> Result<Self, KeyMaterialError> {
        let public_key = URL_SAFE_NO_PAD
            .decode(x)
            .map_err(|e| invalid(kid, format!("'x' is not base64url: {e}")))?;
        Self::ed25519(kid, &public_key)
    }

    /// RSA key from JWK `n` and `e` parameters (base64url).
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if `algorithm` is not an RSA algorithm or the
    /// components do not decode.
    pub fn from_rsa_components(
        kid: &str,
        algorithm: Algorithm,
        n: &str,
        e: &str,
    ) -> Result<Self, KeyMaterialError> {
        if !is_rsa(algorithm) {
            return Err(invalid(kid, format!("{algorithm:?} is not an RSA algorithm")));
        }
        let key = DecodingKey::from_rsa_components(n, e).map_err(|e| invalid(kid, e.to_string()))?;
        Ok(Self { algorithm, key })
    }

    /// EC key from JWK `x` and `y` parameters (base64url).
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if `algorithm` is not ES256/ES384 or the
    /// components do not decode.
    pub fn from_ec_components(
        kid: &str,
        algorithm: Algorithm,
        x: &str,
        y: &str,
    ) -> Result<Self, KeyMaterialError> {
        if !matches!(algorithm, Algorithm::ES256 | Algorithm::ES384) {
            return Err(invalid(kid, format!("{algorithm:?} is not an EC algorithm")));
        }
        let key = DecodingKey::from_ec_components(x, y).map_err(|e| invalid(kid, e.to_string()))?;
        Ok(Self { algorithm, key })
    }

    /// Key from a PEM-encoded public key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if the PEM does not hold a key of the family
    /// `algorithm` belongs to, or if `algorithm` is an HMAC algorithm.
    pub fn from_pem(kid: &str, algorithm: Algorithm, pem: &[u8]) -> Result<Self, KeyMaterialError> {
        let key = match algorithm {
            Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
            alg if is_rsa(alg) => DecodingKey::from_rsa_pem(pem),
            alg => return Err(invalid(kid, format!("{alg:?} is not a public-key algorithm"))),
        }
        .map_err(|e| invalid(kid, e.to_string()))?;
        Ok(Self { algorithm, key })
    }

    /// The only algorithm this key verifies.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Check `signature` (base64url) over `message`.
    ///
    /// `header_alg` is the algorithm named in the token header. A key never
    /// verifies a token whose header names a different algorithm, so a token
    /// cannot steer an RSA key into an HMAC check or claim `none`.
    #[must_use]
    pub fn verifies(&self, header_alg: &str, message: &[u8], signature: &str) -> bool {
        let Ok(alg) = header_alg.parse::<Algorithm>() else {
            return false;
        };
        if alg != self.algorithm {
            return false;
        }
        // Err covers malformed signatures and key/algorithm family mismatches.
        jsonwebtoken::crypto::verify(signature, message, &self.key, self.algorithm).unwrap_or(false)
    }
}

fn is_rsa(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
    )
}

fn invalid(kid: &str, reason: String) -> KeyMaterialError {
    KeyMaterialError::InvalidKey {
        kid: kid.to_string(),
        reason,
    }
}

/// Immutable mapping from key identifier to verification key.
///
/// Iteration is in `kid` order, which makes the no-`kid` key search
/// deterministic.
#[derive(Clone, Default)]
pub struct KeySet {
    keys: BTreeMap<String, VerificationKey>,
}

impl fmt::Debug for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySet")
            .field("kids", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl KeySet {
    /// Build a key set from `(kid, key)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKid` if two entries share a key identifier.
    pub fn new<I>(entries: I) -> Result<Self, KeyMaterialError>
    where
        I: IntoIterator<Item = (String, VerificationKey)>,
    {
        let mut keys = BTreeMap::new();
        for (kid, key) in entries {
            if keys.contains_key(&kid) {
                return Err(KeyMaterialError::DuplicateKid(kid));
            }
            keys.insert(kid, key);
        }
        Ok(Self { keys })
    }

    /// Look up a key by exact `kid`.
    #[must_use]
    pub fn get(&self, kid: &str) -> Option<&VerificationKey> {
        self.keys.get(kid)
    }

    /// Look up a key by exact `kid`, returning the stored identifier with it.
    #[must_use]
    pub fn entry(&self, kid: &str) -> Option<(&str, &VerificationKey)> {
        self.keys
            .get_key_value(kid)
            .map(|(kid, key)| (kid.as_str(), key))
    }

    /// All keys in `kid` order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VerificationKey)> {
        self.keys.iter().map(|(kid, key)| (kid.as_str(), key))
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if the set holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
