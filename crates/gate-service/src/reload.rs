//! Atomic authenticator swapping.
//!
//! Request paths hold an [`AuthenticatorHandle`] and call
//! [`AuthenticatorHandle::current`] once per request. Reloads build a
//! complete new authenticator off to the side and publish it with
//! [`AuthenticatorHandle::replace`]; in-flight requests keep the `Arc` they
//! already took.
//!
//! - Lock-free reads via `tokio::sync::watch`
//! - A failed reload leaves the previous authenticator active

use crate::config::Config;
use crate::observability::metrics::{record_reload, set_providers_configured};
use crate::providers::{build_authenticator, ProviderError};
use gate_core::TokenAuthenticator;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::instrument;

/// Shared, swappable reference to the active authenticator.
#[derive(Clone)]
pub struct AuthenticatorHandle {
    sender: Arc<watch::Sender<Arc<TokenAuthenticator>>>,
}

impl AuthenticatorHandle {
    /// Wrap an initial authenticator.
    #[must_use]
    pub fn new(authenticator: TokenAuthenticator) -> Self {
        let (sender, _receiver) = watch::channel(Arc::new(authenticator));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// The authenticator requests should use right now.
    #[must_use]
    pub fn current(&self) -> Arc<TokenAuthenticator> {
        self.sender.borrow().clone()
    }

    /// Publish a new authenticator, returning the one it replaced.
    pub fn replace(&self, authenticator: TokenAuthenticator) -> Arc<TokenAuthenticator> {
        self.sender.send_replace(Arc::new(authenticator))
    }

    /// Receiver that is notified whenever the authenticator is replaced.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<TokenAuthenticator>> {
        self.sender.subscribe()
    }
}

impl std::fmt::Debug for AuthenticatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatorHandle")
            .field("providers", &self.sender.borrow().len())
            .finish()
    }
}

/// Rebuild the authenticator from `config` and swap it in.
///
/// Returns the number of providers now active.
///
/// # Errors
///
/// Returns the load error and keeps the previous authenticator if any
/// provider fails to load.
#[instrument(skip_all, name = "gate.reload")]
pub async fn reload(handle: &AuthenticatorHandle, config: &Config) -> Result<usize, ProviderError> {
    match build_authenticator(&config.providers_file, config.clock_skew()).await {
        Ok(authenticator) => {
            let providers = authenticator.len();
            handle.replace(authenticator);
            record_reload("success");
            set_providers_configured(providers);
            tracing::info!(target: "gate.reload", providers, "Authenticator reloaded");
            Ok(providers)
        }
        Err(e) => {
            record_reload("error");
            tracing::error!(
                target: "gate.reload",
                error = %e,
                "Authenticator reload failed, keeping previous configuration"
            );
            Err(e)
        }
    }
}

/// Reload on every SIGHUP until the process exits.
#[cfg(unix)]
pub fn spawn_sighup_reloader(
    handle: AuthenticatorHandle,
    config: Config,
) -> std::io::Result<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = signal(SignalKind::hangup())?;
    Ok(tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            tracing::info!(target: "gate.reload", "Received SIGHUP, reloading providers");
            // Failure is logged and counted inside reload().
            let _ = reload(&handle, &config).await;
        }
    }))
}
