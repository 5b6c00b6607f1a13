//! Provider definitions and authenticator construction.
//!
//! Reads the provider file named by `GATE_PROVIDERS_FILE`, resolves each
//! provider's key material, and builds a [`TokenAuthenticator`]:
//!
//! ```json
//! { "providers": [
//!     { "name": "corp", "issuer": "https://idp.example.com",
//!       "audience": "example.com", "required_scopes": ["authzed"],
//!       "jwks_file": "corp-jwks.json" } ] }
//! ```
//!
//! File order is registration order. `jwks_file` is resolved relative to the
//! provider file's directory; `jwks` embeds the document inline instead.
//! Loading is all-or-nothing: a single bad provider fails the whole load.

use gate_core::{
    JwksDocument, KeyMaterialError, KeySet, SetupError, TokenAuthenticator, TrustAnchor,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

/// Top-level provider file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersFile {
    /// Providers in registration order.
    pub providers: Vec<ProviderConfig>,
}

/// One identity provider.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Label used in logs only.
    pub name: String,

    /// Expected `iss` claim.
    pub issuer: String,

    /// Audience tokens must name.
    pub audience: String,

    /// Scopes every token must carry.
    #[serde(default)]
    pub required_scopes: Vec<String>,

    /// JWKS document on disk, relative to the provider file.
    #[serde(default)]
    pub jwks_file: Option<PathBuf>,

    /// JWKS document inline.
    #[serde(default)]
    pub jwks: Option<JwksDocument>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid provider file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Provider file {0} defines no providers")]
    NoProviders(PathBuf),

    #[error("Provider '{name}': field '{field}' must not be empty")]
    EmptyField { name: String, field: &'static str },

    #[error("Provider '{0}': exactly one of 'jwks_file' or 'jwks' is required")]
    KeySource(String),

    #[error("Provider '{name}': {source}")]
    Keys {
        name: String,
        #[source]
        source: KeyMaterialError,
    },

    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Load the provider file at `path` and build an authenticator from it.
///
/// # Errors
///
/// Any [`ProviderError`]; nothing is built unless every provider loads.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn build_authenticator(
    path: &Path,
    clock_skew: Duration,
) -> Result<TokenAuthenticator, ProviderError> {
    let anchors = load_anchors(path).await?;
    let authenticator = TokenAuthenticator::with_clock_skew(anchors, clock_skew)?;
    tracing::info!(
        target: "gate.providers",
        providers = authenticator.len(),
        clock_skew_seconds = clock_skew.as_secs(),
        "Authenticator built"
    );
    Ok(authenticator)
}

/// Load the provider file at `path` into trust anchors, in file order.
///
/// # Errors
///
/// Any [`ProviderError`].
pub async fn load_anchors(path: &Path) -> Result<Vec<TrustAnchor>, ProviderError> {
    let bytes = read(path).await?;
    let file: ProvidersFile = serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if file.providers.is_empty() {
        return Err(ProviderError::NoProviders(path.to_path_buf()));
    }

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut anchors = Vec::with_capacity(file.providers.len());
    for provider in &file.providers {
        anchors.push(load_provider(provider, base_dir).await?);
    }
    Ok(anchors)
}

async fn load_provider(
    provider: &ProviderConfig,
    base_dir: &Path,
) -> Result<TrustAnchor, ProviderError> {
    for (field, value) in [
        ("name", &provider.name),
        ("issuer", &provider.issuer),
        ("audience", &provider.audience),
    ] {
        if value.is_empty() {
            return Err(ProviderError::EmptyField {
                name: provider.name.clone(),
                field,
            });
        }
    }

    let keys_error = |source: KeyMaterialError| ProviderError::Keys {
        name: provider.name.clone(),
        source,
    };

    let keys = match (&provider.jwks_file, &provider.jwks) {
        (Some(file), None) => {
            let bytes = read(&base_dir.join(file)).await?;
            KeySet::from_jwks_json(&bytes).map_err(keys_error)?
        }
        (None, Some(document)) => KeySet::from_jwks(document).map_err(keys_error)?,
        _ => return Err(ProviderError::KeySource(provider.name.clone())),
    };

    tracing::info!(
        target: "gate.providers",
        provider = %provider.name,
        issuer = %provider.issuer,
        audience = %provider.audience,
        keys = keys.len(),
        "Provider loaded"
    );

    Ok(TrustAnchor::new(
        provider.issuer.clone(),
        provider.audience.clone(),
        provider.required_scopes.iter().cloned(),
        keys,
    ))
}

async fn read(path: &Path) -> Result<Vec<u8>, ProviderError> {
    tokio::fs::read(path).await.map_err(|source| ProviderError::Io {
        path: path.to_path_buf(),
        source,
    })
}
