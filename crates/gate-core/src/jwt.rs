//! Compact JWS parsing.
//!
//! This module provides the structural half of token validation:
//! - Size limits for DoS prevention
//! - Clock skew constants shared by claim validation and configuration
//! - `Bearer` prefix handling for values lifted straight from a header
//! - Splitting and decoding of `header.payload.signature`
//!
//! Nothing here verifies a signature or judges a claim. [`parse`] only
//! guarantees that the three segments decode and that header and payload
//! are JSON objects. Field types are judged later, by the check that reads
//! them.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE any decoding
//! - Parse failures are reported as a single [`AuthError::MalformedToken`];
//!   details go to debug logs only and never include token content

use crate::claims::TokenClaims;
use crate::errors::AuthError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// Typical provider tokens are well under 2KB, RSA-signed ones included.
/// Anything larger is rejected before base64 decoding allocates.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Default clock skew tolerance applied to `nbf` and `exp` (5 minutes).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Maximum clock skew tolerance an authenticator may be built with (10 minutes).
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

const BEARER_SCHEME: &str = "bearer";

// =============================================================================
// Types
// =============================================================================

/// JOSE header fields the gate reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenHeader {
    /// Signature algorithm name as written by the issuer (e.g. `EdDSA`, `RS256`).
    /// A header without a string `alg` cannot be verified by any key.
    #[serde(default, deserialize_with = "crate::claims::lenient")]
    pub alg: Option<String>,

    /// Key identifier. Empty or non-string values are normalised to `None`.
    #[serde(default, deserialize_with = "crate::claims::lenient")]
    pub kid: Option<String>,

    /// Media type, informational only.
    #[serde(default, deserialize_with = "crate::claims::lenient")]
    pub typ: Option<String>,
}

/// A token split into its parts.
///
/// Lives for the duration of one authentication call. Debug output omits the
/// signature and signing input.
#[derive(Clone)]
pub struct ParsedToken {
    /// Decoded header.
    pub header: TokenHeader,

    /// Decoded claims.
    pub claims: TokenClaims,

    signing_input: String,
    signature: String,
}

impl fmt::Debug for ParsedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedToken")
            .field("header", &self.header)
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

impl ParsedToken {
    /// The bytes covered by the signature: `base64(header) "." base64(payload)`.
    #[must_use]
    pub fn signing_input(&self) -> &[u8] {
        self.signing_input.as_bytes()
    }

    /// The signature segment, still base64url encoded.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Strip an optional `Bearer` scheme from an authorization value.
///
/// Accepts either a bare compact token or `"<scheme> <token>"` where the
/// scheme is `bearer` in any letter case. Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`AuthError::MalformedToken`] when the value is empty, the scheme
/// is something other than `bearer`, or more than one segment would remain
/// after removing the prefix.
pub fn strip_bearer(value: &str) -> Result<&str, AuthError> {
    let mut segments = value.split_whitespace();
    let first = segments.next().ok_or_else(|| {
        tracing::debug!(target: "gate.jwt", "Token rejected: empty credential");
        AuthError::MalformedToken
    })?;

    match (segments.next(), segments.next()) {
        (None, _) => Ok(first),
        (Some(token), None) if first.eq_ignore_ascii_case(BEARER_SCHEME) => Ok(token),
        _ => {
            tracing::debug!(
                target: "gate.jwt",
                "Token rejected: credential is not a single bearer token"
            );
            Err(AuthError::MalformedToken)
        }
    }
}

/// Parse a compact JWS into header, claims and signature.
///
/// # Errors
///
/// Returns [`AuthError::MalformedToken`] if the token:
/// - exceeds [`MAX_JWT_SIZE_BYTES`]
/// - does not contain exactly two `.` separators
/// - has a segment that is not unpadded base64url
/// - has a header or payload that is not a JSON object
pub fn parse(token: &str) -> Result<ParsedToken, AuthError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "gate.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(AuthError::MalformedToken);
    }

    let (signing_input, signature) = token.rsplit_once('.').ok_or(AuthError::MalformedToken)?;
    let (header_b64, payload_b64) = signing_input
        .split_once('.')
        .ok_or(AuthError::MalformedToken)?;

    // rsplit_once/split_once leave any extra separators inside the payload.
    if payload_b64.contains('.') {
        tracing::debug!(
            target: "gate.jwt",
            parts = token.split('.').count(),
            "Token rejected: invalid JWT format"
        );
        return Err(AuthError::MalformedToken);
    }

    let header: TokenHeader = decode_segment(header_b64, "header")?;
    let claims: TokenClaims = decode_segment(payload_b64, "payload")?;

    URL_SAFE_NO_PAD.decode(signature).map_err(|e| {
        tracing::debug!(target: "gate.jwt", error = %e, "Failed to decode JWT signature base64");
        AuthError::MalformedToken
    })?;

    Ok(ParsedToken {
        header: TokenHeader {
            kid: header.kid.filter(|kid| !kid.is_empty()),
            ..header
        },
        claims,
        signing_input: signing_input.to_string(),
        signature: signature.to_string(),
    })
}

fn decode_segment<T>(segment: &str, name: &'static str) -> Result<T, AuthError>
where
    T: for<'de> Deserialize<'de>,
{
    let bytes = URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        tracing::debug!(target: "gate.jwt", segment = name, error = %e, "Failed to decode JWT segment base64");
        AuthError::MalformedToken
    })?;

    // Objects only: a bare string or array must not satisfy a struct with all-optional fields.
    let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(target: "gate.jwt", segment = name, error = %e, "Failed to parse JWT segment JSON");
        AuthError::MalformedToken
    })?;
    if !value.is_object() {
        tracing::debug!(target: "gate.jwt", segment = name, "JWT segment is not a JSON object");
        return Err(AuthError::MalformedToken);
    }

    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(target: "gate.jwt", segment = name, error = %e, "JWT segment has unexpected shape");
        AuthError::MalformedToken
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::claims::NumericDate;

    fn b64(s: &str) -> String {
        URL_SAFE_NO_PAD.encode(s)
    }

    fn token(header: &str, payload: &str) -> String {
        format!("{}.{}.{}", b64(header), b64(payload), b64("signature"))
    }

    const HEADER: &str = r#"{"alg":"EdDSA","typ":"JWT","kid":"test-key-01"}"#;

    // -------------------------------------------------------------------------
    // Constants Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_max_jwt_size_is_8kb() {
        assert_eq!(MAX_JWT_SIZE_BYTES, 8192);
    }

    #[test]
    fn test_clock_skew_bounds() {
        assert_eq!(DEFAULT_CLOCK_SKEW, Duration::from_secs(300));
        assert_eq!(MAX_CLOCK_SKEW, Duration::from_secs(600));
    }

    // -------------------------------------------------------------------------
    // strip_bearer Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_strip_bearer_raw_token() {
        assert_eq!(strip_bearer("a.b.c").unwrap(), "a.b.c");
        assert_eq!(strip_bearer("  a.b.c \n").unwrap(), "a.b.c");
    }

    #[test]
    fn test_strip_bearer_any_case() {
        assert_eq!(strip_bearer("Bearer a.b.c").unwrap(), "a.b.c");
        assert_eq!(strip_bearer("bearer a.b.c").unwrap(), "a.b.c");
        assert_eq!(strip_bearer("BEARER   a.b.c").unwrap(), "a.b.c");
    }

    #[test]
    fn test_strip_bearer_rejects_ambiguous() {
        assert_eq!(strip_bearer(""), Err(AuthError::MalformedToken));
        assert_eq!(strip_bearer("   "), Err(AuthError::MalformedToken));
        assert_eq!(strip_bearer("Basic dXNlcjpwYXNz"), Err(AuthError::MalformedToken));
        assert_eq!(strip_bearer("Bearer a.b.c extra"), Err(AuthError::MalformedToken));
        assert_eq!(strip_bearer("Bearer Bearer a.b.c"), Err(AuthError::MalformedToken));
    }

    #[test]
    fn test_strip_bearer_only_scheme_is_token() {
        // A lone word is taken as the token; parsing rejects it later.
        assert_eq!(strip_bearer("Bearer").unwrap(), "Bearer");
    }

    // -------------------------------------------------------------------------
    // parse Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_valid_token() {
        let raw = token(HEADER, r#"{"iss":"example.com/issuer","sub":"alice","exp":4102444800}"#);
        let parsed = parse(&raw).unwrap();

        assert_eq!(parsed.header.alg.as_deref(), Some("EdDSA"));
        assert_eq!(parsed.header.kid.as_deref(), Some("test-key-01"));
        assert_eq!(parsed.claims.iss.as_deref(), Some("example.com/issuer"));
        assert_eq!(parsed.claims.exp, Some(NumericDate::Seconds(4_102_444_800)));

        let (signing_input, signature) = raw.rsplit_once('.').unwrap();
        assert_eq!(parsed.signing_input(), signing_input.as_bytes());
        assert_eq!(parsed.signature(), signature);
    }

    #[test]
    fn test_parse_segment_counts() {
        assert_eq!(parse("").unwrap_err(), AuthError::MalformedToken);
        assert_eq!(parse("single").unwrap_err(), AuthError::MalformedToken);
        assert_eq!(parse("only.two").unwrap_err(), AuthError::MalformedToken);
        assert_eq!(
            parse("not.a.valid.jwt.format").unwrap_err(),
            AuthError::MalformedToken
        );

        let four = format!("{}.sig", token(HEADER, "{}"));
        assert_eq!(parse(&four).unwrap_err(), AuthError::MalformedToken);
    }

    #[test]
    fn test_parse_invalid_base64() {
        assert_eq!(
            parse("!!!invalid!!!.e30.c2ln").unwrap_err(),
            AuthError::MalformedToken
        );
        let bad_payload = format!("{}.!!!.c2ln", b64(HEADER));
        assert_eq!(parse(&bad_payload).unwrap_err(), AuthError::MalformedToken);
        let bad_sig = format!("{}.{}.!!!", b64(HEADER), b64("{}"));
        assert_eq!(parse(&bad_sig).unwrap_err(), AuthError::MalformedToken);
    }

    #[test]
    fn test_parse_rejects_padded_base64() {
        // "{}" encodes to "e30=" with standard padding
        let padded = format!("{}.e30=.c2ln", b64(HEADER));
        assert_eq!(parse(&padded).unwrap_err(), AuthError::MalformedToken);
    }

    #[test]
    fn test_parse_invalid_json() {
        let raw = token("not-json", "{}");
        assert_eq!(parse(&raw).unwrap_err(), AuthError::MalformedToken);
        let raw = token(HEADER, "not-json");
        assert_eq!(parse(&raw).unwrap_err(), AuthError::MalformedToken);
    }

    #[test]
    fn test_parse_requires_objects() {
        assert_eq!(
            parse(&token(HEADER, "[]")).unwrap_err(),
            AuthError::MalformedToken
        );
        assert_eq!(
            parse(&token(HEADER, r#""sub""#)).unwrap_err(),
            AuthError::MalformedToken
        );
        assert_eq!(
            parse(&token("42", "{}")).unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn test_parse_header_without_alg() {
        let parsed = parse(&token(r#"{"typ":"JWT","kid":"k"}"#, "{}")).unwrap();
        assert!(parsed.header.alg.is_none());

        let parsed = parse(&token(r#"{"alg":256}"#, "{}")).unwrap();
        assert!(parsed.header.alg.is_none());
    }

    #[test]
    fn test_parse_wrongly_typed_claims_is_ok() {
        let parsed = parse(&token(HEADER, r#"{"iss":42,"exp":"tomorrow"}"#)).unwrap();
        assert!(parsed.claims.iss.is_none());
        assert_eq!(parsed.claims.exp, Some(NumericDate::Invalid));
    }

    #[test]
    fn test_parse_empty_claims_is_ok() {
        let parsed = parse(&token(HEADER, "{}")).unwrap();
        assert!(parsed.claims.iss.is_none());
        assert!(parsed.claims.subject().is_none());
    }

    #[test]
    fn test_parse_empty_kid_is_absent() {
        let parsed = parse(&token(r#"{"alg":"EdDSA","kid":""}"#, "{}")).unwrap();
        assert!(parsed.header.kid.is_none());
    }

    #[test]
    fn test_parse_non_string_kid_is_absent() {
        let parsed = parse(&token(r#"{"alg":"EdDSA","kid":12345,"typ":1}"#, "{}")).unwrap();
        assert!(parsed.header.kid.is_none());
        assert!(parsed.header.typ.is_none());
    }

    #[test]
    fn test_parse_oversized_token() {
        let oversized = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        assert_eq!(parse(&oversized).unwrap_err(), AuthError::MalformedToken);
    }

    #[test]
    fn test_parse_at_size_limit() {
        let header_b64 = b64(HEADER);
        let payload_b64 = b64("{}");
        let remaining = MAX_JWT_SIZE_BYTES - header_b64.len() - payload_b64.len() - 2;
        // Signature alphabet only; length must be a valid unpadded base64 length.
        let sig_len = remaining - (remaining % 4);
        let raw = format!("{header_b64}.{payload_b64}.{}", "A".repeat(sig_len));

        assert!(raw.len() <= MAX_JWT_SIZE_BYTES);
        assert!(parse(&raw).is_ok(), "Token within size limit should parse");
    }

    #[test]
    fn test_parsed_token_debug_omits_signature_and_subject() {
        let raw = token(HEADER, r#"{"sub":"secret-user-id"}"#);
        let parsed = parse(&raw).unwrap();
        let debug_str = format!("{parsed:?}");
        assert!(!debug_str.contains("secret-user-id"));
        assert!(!debug_str.contains(&b64("signature")));
    }
}
