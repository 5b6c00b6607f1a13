//! Helpers for forging tokens after they were signed.
//!
//! Each helper rewrites one segment and leaves the others byte-for-byte
//! intact, so the original signature no longer covers the content.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::Value;

fn segments(token: &str) -> (&str, &str, &str) {
    let mut parts = token.splitn(3, '.');
    let header = parts.next().expect("token has a header segment");
    let payload = parts.next().expect("token has a payload segment");
    let signature = parts.next().expect("token has a signature segment");
    (header, payload, signature)
}

fn decode_json(segment: &str) -> Value {
    let bytes = URL_SAFE_NO_PAD.decode(segment).expect("segment is base64url");
    serde_json::from_slice(&bytes).expect("segment is JSON")
}

fn encode_json(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).expect("JSON serializes"))
}

/// Replace one payload claim, keeping the original header and signature.
///
/// # Example
/// ```rust,ignore
/// let forged = tamper_claim(&token, "sub", json!("mallory"));
/// ```
pub fn tamper_claim(token: &str, name: &str, value: Value) -> String {
    let (header, payload, signature) = segments(token);
    let mut claims = decode_json(payload);
    claims
        .as_object_mut()
        .expect("payload is a JSON object")
        .insert(name.to_string(), value);
    format!("{header}.{}.{signature}", encode_json(&claims))
}

/// Replace one header field, keeping the original payload and signature.
pub fn tamper_header(token: &str, name: &str, value: Value) -> String {
    let (header, payload, signature) = segments(token);
    let mut header = decode_json(header);
    header
        .as_object_mut()
        .expect("header is a JSON object")
        .insert(name.to_string(), value);
    format!("{}.{payload}.{signature}", encode_json(&header))
}

/// Replace the signature segment.
pub fn replace_signature(token: &str, signature: &[u8]) -> String {
    let (header, payload, _) = segments(token);
    format!("{header}.{payload}.{}", URL_SAFE_NO_PAD.encode(signature))
}

/// Build an unsigned token (`alg` as given, empty signature segment).
pub fn unsigned_token(header: &Value, claims: &Value) -> String {
    format!("{}.{}.", encode_json(header), encode_json(claims))
}
