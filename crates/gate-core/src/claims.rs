//! JWT claim set and scope matching.
//!
//! No claim is assumed present at parse time; every field is optional and
//! absence is decided by the validation step that needs it. A known claim
//! with the wrong JSON type does not make the payload malformed: string,
//! audience and scope claims read as absent, and time claims read as
//! [`NumericDate::Invalid`], which fails its check.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Claims read from a token payload.
///
/// The `sub` field is redacted in Debug output.
#[derive(Clone, Default, Deserialize)]
pub struct TokenClaims {
    /// Issuer.
    #[serde(default, deserialize_with = "lenient")]
    pub iss: Option<String>,

    /// Audience, single string or list.
    #[serde(default, deserialize_with = "lenient")]
    pub aud: Option<Audience>,

    /// Subject - redacted in Debug output.
    #[serde(default, deserialize_with = "lenient")]
    pub sub: Option<String>,

    /// Granted scopes.
    #[serde(default, deserialize_with = "lenient")]
    pub scope: Option<ScopeClaim>,

    /// Issued-at.
    #[serde(default, deserialize_with = "numeric_date")]
    pub iat: Option<NumericDate>,

    /// Not-before.
    #[serde(default, deserialize_with = "numeric_date")]
    pub nbf: Option<NumericDate>,

    /// Expiration.
    #[serde(default, deserialize_with = "numeric_date")]
    pub exp: Option<NumericDate>,
}

/// A time claim as found in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericDate {
    /// Unix epoch seconds.
    Seconds(i64),
    /// Present but not a JSON number.
    Invalid,
}

impl NumericDate {
    /// The timestamp, or `None` if the claim was not a number.
    #[must_use]
    pub fn seconds(self) -> Option<i64> {
        match self {
            NumericDate::Seconds(seconds) => Some(seconds),
            NumericDate::Invalid => None,
        }
    }
}

impl fmt::Debug for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaims")
            .field("iss", &self.iss)
            .field("aud", &self.aud)
            .field("sub", &self.sub.as_ref().map(|_| "[REDACTED]"))
            .field("scope", &self.scope)
            .field("iat", &self.iat)
            .field("nbf", &self.nbf)
            .field("exp", &self.exp)
            .finish()
    }
}

impl TokenClaims {
    /// Scopes granted by the token as a set. Empty when `scope` is absent.
    #[must_use]
    pub fn scopes(&self) -> BTreeSet<&str> {
        self.scope
            .as_ref()
            .map(ScopeClaim::scopes)
            .unwrap_or_default()
    }

    /// The subject, if present and non-empty.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().filter(|s| !s.is_empty())
    }
}

/// The `aud` claim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// `"aud": "example.com"`
    Single(String),
    /// `"aud": ["example.com", "other"]`
    Many(Vec<String>),
}

impl Audience {
    /// True if `expected` is the audience or one of the listed audiences.
    #[must_use]
    pub fn contains(&self, expected: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == expected,
            Audience::Many(auds) => auds.iter().any(|aud| aud == expected),
        }
    }
}

/// The `scope` claim.
///
/// Normally a space-delimited string. Some providers emit a JSON array
/// instead; each array element is taken as one scope verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScopeClaim {
    /// `"scope": "read write"`
    Delimited(String),
    /// `"scope": ["read", "write"]`
    List(Vec<String>),
}

impl ScopeClaim {
    /// Scopes as a set.
    #[must_use]
    pub fn scopes(&self) -> BTreeSet<&str> {
        match self {
            ScopeClaim::Delimited(scope) => scope.split_whitespace().collect(),
            ScopeClaim::List(scopes) => scopes
                .iter()
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// True iff every scope in `required` appears in `token_scopes`.
///
/// Matching is exact and case-sensitive. An empty `required` set always
/// matches.
#[must_use]
pub fn has_required_scopes(token_scopes: &BTreeSet<&str>, required: &BTreeSet<String>) -> bool {
    required
        .iter()
        .all(|scope| token_scopes.contains(scope.as_str()))
}

/// Deserialize a claim, reading a value of the wrong JSON type as absent.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Option::<T>::deserialize(value).ok().flatten())
}

/// NumericDate per RFC 7519: integer or fractional seconds. Fractions are
/// truncated; values outside `i64` saturate. `null` reads as absent.
fn numeric_date<'de, D>(deserializer: D) -> Result<Option<NumericDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Number(n) => {
            // Saturating cast: out-of-range floats clamp to i64::MIN/MAX
            #[allow(clippy::cast_possible_truncation)]
            let seconds = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64));
            Some(seconds.map_or(NumericDate::Invalid, NumericDate::Seconds))
        }
        _ => Some(NumericDate::Invalid),
    })
}
