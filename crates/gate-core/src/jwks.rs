//! JWKS documents to key sets.
//!
//! Converts an already-fetched JSON Web Key Set into the immutable
//! [`KeySet`] a trust anchor owns. Fetching, caching and refreshing the
//! document is the bootstrap collaborator's job; this module does no I/O.
//!
//! # Accepted keys
//!
//! - `OKP` / `Ed25519` → EdDSA
//! - `RSA` → the JWK's `alg` if it names an RSA algorithm, else RS256
//! - `EC` / `P-256` → ES256, `EC` / `P-384` → ES384
//!
//! Keys whose `use` is not `sig`, keys without a `kid`, and key types the
//! gate cannot verify with (`oct`, `X25519`, `P-521`, ...) are skipped. A key
//! that claims a supported type but has broken parameters fails the whole
//! document: a half-loaded provider is worse than a loud startup error.

use crate::errors::KeyMaterialError;
use crate::keys::{KeySet, VerificationKey};
use jsonwebtoken::Algorithm;
use serde::Deserialize;

/// JSON Web Key as published by an identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (`OKP`, `RSA`, `EC`, ...).
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    #[serde(default)]
    pub kid: Option<String>,

    /// Curve name for OKP/EC keys.
    #[serde(default)]
    pub crv: Option<String>,

    /// OKP public key, or EC x coordinate (base64url).
    #[serde(default)]
    pub x: Option<String>,

    /// EC y coordinate (base64url).
    #[serde(default)]
    pub y: Option<String>,

    /// RSA modulus (base64url).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url).
    #[serde(default)]
    pub e: Option<String>,

    /// Algorithm the key is intended for.
    #[serde(default)]
    pub alg: Option<String>,

    /// Key use (should be "sig" for signing).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
}

/// JWKS document.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksDocument {
    /// List of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

impl KeySet {
    /// Parse a JWKS document from JSON bytes and build a key set.
    ///
    /// # Errors
    ///
    /// `MalformedDocument` if the bytes are not a JWKS document, otherwise
    /// as [`KeySet::from_jwks`].
    pub fn from_jwks_json(bytes: &[u8]) -> Result<Self, KeyMaterialError> {
        let document: JwksDocument = serde_json::from_slice(bytes)
            .map_err(|e| KeyMaterialError::MalformedDocument(e.to_string()))?;
        Self::from_jwks(&document)
    }

    /// Build a key set from a parsed JWKS document.
    ///
    /// # Errors
    ///
    /// - `InvalidKey` if a supported key has unusable parameters
    /// - `DuplicateKid` if two usable keys share a `kid`
    /// - `NoUsableKeys` if nothing in the document can verify signatures
    pub fn from_jwks(document: &JwksDocument) -> Result<Self, KeyMaterialError> {
        let mut entries = Vec::with_capacity(document.keys.len());
        for jwk in &document.keys {
            if let Some(entry) = convert(jwk)? {
                entries.push(entry);
            }
        }

        if entries.is_empty() {
            tracing::warn!(
                target: "gate.jwks",
                published = document.keys.len(),
                "JWKS contains no usable signing keys"
            );
            return Err(KeyMaterialError::NoUsableKeys);
        }

        let set = Self::new(entries)?;
        tracing::debug!(
            target: "gate.jwks",
            published = document.keys.len(),
            usable = set.len(),
            "Built key set from JWKS"
        );
        Ok(set)
    }
}

fn convert(jwk: &Jwk) -> Result<Option<(String, VerificationKey)>, KeyMaterialError> {
    let Some(kid) = jwk.kid.as_deref().filter(|kid| !kid.is_empty()) else {
        tracing::debug!(target: "gate.jwks", kty = %jwk.kty, "Skipping JWK without kid");
        return Ok(None);
    };

    if let Some(key_use) = jwk.key_use.as_deref() {
        if key_use != "sig" {
            tracing::debug!(target: "gate.jwks", kid = %kid, key_use = %key_use, "Skipping non-signing JWK");
            return Ok(None);
        }
    }

    let declared_alg = match jwk.alg.as_deref().map(str::parse::<Algorithm>) {
        None => None,
        Some(Ok(alg)) => Some(alg),
        Some(Err(_)) => {
            tracing::warn!(target: "gate.jwks", kid = %kid, "Skipping JWK with unknown alg");
            return Ok(None);
        }
    };

    let key = match (jwk.kty.as_str(), jwk.crv.as_deref()) {
        ("OKP", Some("Ed25519")) => {
            require_alg(kid, declared_alg, &[Algorithm::EdDSA])?;
            let x = required(kid, "x", jwk.x.as_deref())?;
            VerificationKey::from_okp_components(kid, x)?
        }
        ("RSA", _) => {
            let alg = declared_alg.unwrap_or(Algorithm::RS256);
            let n = required(kid, "n", jwk.n.as_deref())?;
            let e = required(kid, "e", jwk.e.as_deref())?;
            VerificationKey::from_rsa_components(kid, alg, n, e)?
        }
        ("EC", Some(crv @ ("P-256" | "P-384"))) => {
            let alg = if crv == "P-256" {
                Algorithm::ES256
            } else {
                Algorithm::ES384
            };
            require_alg(kid, declared_alg, &[alg])?;
            let x = required(kid, "x", jwk.x.as_deref())?;
            let y = required(kid, "y", jwk.y.as_deref())?;
            VerificationKey::from_ec_components(kid, alg, x, y)?
        }
        (kty, crv) => {
            tracing::warn!(
                target: "gate.jwks",
                kid = %kid,
                kty = %kty,
                crv = ?crv,
                "Skipping JWK with unsupported key type"
            );
            return Ok(None);
        }
    };

    Ok(Some((kid.to_string(), key)))
}

fn required<'a>(kid: &str, name: &str, value: Option<&'a str>) -> Result<&'a str, KeyMaterialError> {
    value.ok_or_else(|| KeyMaterialError::InvalidKey {
        kid: kid.to_string(),
        reason: format!("missing '{name}' parameter"),
    })
}

fn require_alg(
    kid: &str,
    declared: Option<Algorithm>,
    allowed: &[Algorithm],
) -> Result<(), KeyMaterialError> {
    match declared {
        Some(alg) if !allowed.contains(&alg) => Err(KeyMaterialError::InvalidKey {
            kid: kid.to_string(),
            reason: format!("alg {alg:?} does not match key type"),
        }),
        _ => Ok(()),
    }
}
