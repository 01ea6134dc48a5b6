//! Credential state for the OAuth session
//!
//! Holds the immutable client identity (id, secret, environment) and the
//! mutable token pair. A tokio Mutex serializes token mutation from
//! exchange and refresh against concurrent reads; reads acquire the lock
//! briefly to clone the current state.
//!
//! The store is memory-only and process-lifetime. Persisting tokens across
//! restarts (the original deployment kept them in a `.env` file) is the
//! caller's concern: load them at startup, seed the store, and read them
//! back out after a refresh if they should survive the process.

use common::Secret;
use tokio::sync::Mutex;
use tracing::debug;

use crate::constants::{PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
use crate::error::{Error, Result};

/// Which Dexcom deployment the session talks to.
///
/// Chosen once at construction, never switched at runtime. Sandbox serves
/// simulated data and accepts any registered app; production requires
/// Dexcom's approval and serves real user data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    /// Base URL of this deployment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }

    /// Environment label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }
}

/// Mutable token pair, owned by the store.
#[derive(Debug)]
struct TokenState {
    access: Option<String>,
    refresh: Option<String>,
}

/// Single-process credential store.
///
/// Client id, secret, and environment are frozen at construction; only the
/// token pair mutates, and only through [`CredentialStore::apply_token_response`].
/// One instance is active per process, shared by `Arc` with the session.
pub struct CredentialStore {
    environment: Environment,
    base_url: String,
    client_id: String,
    client_secret: Secret<String>,
    tokens: Mutex<TokenState>,
}

impl CredentialStore {
    /// Create a store from externally loaded configuration.
    ///
    /// `access` / `refresh` seed the token state from whatever the caller
    /// persisted; either may be absent. An absent refresh token with a
    /// present access token means refresh is impossible once that access
    /// token expires — the full authorization flow must be re-run.
    ///
    /// Fails with a configuration error if the client id or secret is empty.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access: Option<String>,
        refresh: Option<String>,
        environment: Environment,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        if client_id.is_empty() {
            return Err(Error::Configuration("client id must not be empty".into()));
        }
        if client_secret.is_empty() {
            return Err(Error::Configuration(
                "client secret must not be empty".into(),
            ));
        }

        debug!(
            environment = environment.label(),
            has_access = access.as_deref().is_some_and(|t| !t.is_empty()),
            has_refresh = refresh.as_deref().is_some_and(|t| !t.is_empty()),
            "credential store initialized"
        );

        Ok(Self {
            environment,
            base_url: environment.base_url().to_string(),
            client_id,
            client_secret: Secret::new(client_secret),
            tokens: Mutex::new(TokenState {
                access: non_empty(access),
                refresh: non_empty(refresh),
            }),
        })
    }

    /// Point the store at a different base URL (tests against a stub server).
    ///
    /// The environment selection stays as constructed; only the endpoint
    /// prefix changes.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Current access token, if any. `None` means unauthenticated.
    pub async fn access_token(&self) -> Option<String> {
        self.tokens.lock().await.access.clone()
    }

    /// Current refresh token, if any. `None` means the full authorization
    /// flow must be re-run before the session can recover from expiry.
    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.lock().await.refresh.clone()
    }

    /// Apply a token-endpoint response.
    ///
    /// The access token is overwritten unconditionally. The refresh token is
    /// overwritten only when a non-empty one is supplied: the provider may
    /// omit it on refresh, in which case the prior refresh token remains
    /// valid and must be retained.
    pub async fn apply_token_response(&self, access: String, refresh: Option<String>) {
        let mut tokens = self.tokens.lock().await;
        tokens.access = Some(access);
        match non_empty(refresh) {
            Some(reissued) => {
                tokens.refresh = Some(reissued);
                debug!("applied token response, refresh token reissued");
            }
            None => debug!("applied token response, prior refresh token retained"),
        }
    }

    /// Selected environment.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Base endpoint for all provider calls.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// OAuth client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// OAuth client secret. Redacted in Debug/Display; expose only into
    /// request bodies.
    pub fn client_secret(&self) -> &Secret<String> {
        &self.client_secret
    }
}

/// Treat empty strings from the caller's config layer as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
