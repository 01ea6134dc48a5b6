//! OAuth session and authenticated fetch
//!
//! The session owns the three OAuth operations (authorization URL, code
//! exchange, refresh) and the authenticated fetch that retries exactly once
//! on a 401. Token validity is assumed optimistically — no validation round
//! trip before a data call; the provider's 401 is the only expiry signal.
//!
//! One `op_lock` serializes every sequence that may mutate token state, and
//! is held from the ensure-authenticated check through the retried fetch.
//! Without it, two callers could observe the same 401 and issue duplicate
//! refresh calls — and the provider may rotate the refresh token on each
//! use, which would invalidate the loser's session entirely.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use dexcom_auth::constants::EGVS_PATH;
use dexcom_auth::credentials::CredentialStore;
use dexcom_auth::error::{Error, Result};
use dexcom_auth::{authorize, token};

use crate::reading::{EgvsResponse, GlucoseReading};

/// Trailing query window for the latest-reading fetch.
const DEFAULT_WINDOW_HOURS: i64 = 1;

/// Single-user OAuth session over a shared credential store.
pub struct OAuthSession {
    store: Arc<CredentialStore>,
    http: reqwest::Client,
    /// Serializes ensure/refresh/fetch sequences end to end.
    op_lock: Mutex<()>,
}

impl OAuthSession {
    /// Create a session with a default HTTP client.
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self::with_http_client(store, reqwest::Client::new())
    }

    /// Create a session with an injected HTTP client (caller-configured
    /// timeouts, proxies).
    pub fn with_http_client(store: Arc<CredentialStore>, http: reqwest::Client) -> Self {
        Self {
            store,
            http,
            op_lock: Mutex::new(()),
        }
    }

    /// The underlying credential store, e.g. for reading tokens back out
    /// after an exchange when the caller persists them.
    pub fn credential_store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Authorization URL for the user-consent leg of the flow.
    pub fn authorization_url(&self) -> String {
        authorize::build_authorization_url(&self.store)
    }

    /// Exchange an authorization code for tokens and store them.
    ///
    /// Codes are single-use by provider contract, so there is no internal
    /// retry: a failed exchange leaves the store untouched and the caller
    /// must re-run the authorization flow for a fresh code.
    pub async fn exchange_code(&self, code: &str) -> Result<()> {
        let code = code.trim();
        if code.is_empty() {
            return Err(Error::Configuration(
                "authorization code must not be empty".into(),
            ));
        }

        let _guard = self.op_lock.lock().await;
        let response = token::exchange_code(&self.http, &self.store, code).await?;
        self.store
            .apply_token_response(response.access_token, response.refresh_token)
            .await;
        info!("authorization code exchanged, tokens stored");
        Ok(())
    }

    /// Refresh the access token using the stored refresh token.
    ///
    /// Fails with `NoRefreshToken` — before any network call — when nothing
    /// is stored to refresh; that state is recoverable only by re-running
    /// the full authorization flow. A failed refresh leaves the stale
    /// tokens in place, so a transient outage does not force
    /// re-authorization.
    pub async fn refresh_access_token(&self) -> Result<()> {
        let _guard = self.op_lock.lock().await;
        self.refresh_locked().await
    }

    /// Check that a data call can be attempted, refreshing if needed.
    ///
    /// A stored access token passes without a validation round trip; the
    /// 401 path in [`Self::fetch_latest_reading`] catches the case where it
    /// turns out to be expired. With no access token but a refresh token,
    /// exactly one refresh is issued. With neither, the caller must run the
    /// authorization-code flow out of band.
    pub async fn ensure_authenticated(&self) -> Result<()> {
        let _guard = self.op_lock.lock().await;
        self.ensure_locked().await
    }

    /// Fetch the most recent reading from the default one-hour window.
    ///
    /// `Ok(None)` means the provider returned no readings — a normal
    /// outcome, not an error; the sandbox environment may return empty sets
    /// indefinitely.
    pub async fn fetch_latest_reading(&self) -> Result<Option<GlucoseReading>> {
        self.fetch_latest_reading_within(Duration::hours(DEFAULT_WINDOW_HOURS))
            .await
    }

    /// Fetch the most recent reading from a custom trailing window.
    ///
    /// On a 401 the session refreshes and reissues the identical request
    /// exactly once with the new bearer token, then terminates regardless
    /// of the retry's outcome. If the refresh itself fails, the remote
    /// session is fully invalid and the error is `AuthenticationExpired`.
    pub async fn fetch_latest_reading_within(
        &self,
        window: Duration,
    ) -> Result<Option<GlucoseReading>> {
        let _guard = self.op_lock.lock().await;
        self.ensure_locked().await?;

        let access = self.store.access_token().await.ok_or(Error::NotAuthorized)?;
        let (start, end) = trailing_window(window);
        let response = self.get_egvs(&access, &start, &end).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("access token rejected, refreshing and retrying once");
            if let Err(e) = self.refresh_locked().await {
                warn!(error = %e, "refresh after 401 failed");
                return Err(Error::AuthenticationExpired(format!(
                    "token rejected and refresh failed: {e}"
                )));
            }
            let access = self.store.access_token().await.ok_or(Error::NotAuthorized)?;
            let retried = self.get_egvs(&access, &start, &end).await?;
            return decode_latest(retried).await;
        }

        decode_latest(response).await
    }

    async fn ensure_locked(&self) -> Result<()> {
        if self.store.access_token().await.is_some() {
            return Ok(());
        }
        if self.store.refresh_token().await.is_some() {
            debug!("no access token stored, refreshing");
            return self.refresh_locked().await;
        }
        Err(Error::NotAuthorized)
    }

    async fn refresh_locked(&self) -> Result<()> {
        let refresh = self
            .store
            .refresh_token()
            .await
            .ok_or(Error::NoRefreshToken)?;
        let response = token::refresh_token(&self.http, &self.store, &refresh).await?;
        self.store
            .apply_token_response(response.access_token, response.refresh_token)
            .await;
        info!("access token refreshed");
        Ok(())
    }

    async fn get_egvs(&self, access: &str, start: &str, end: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.store.base_url(), EGVS_PATH);
        self.http
            .get(&url)
            .bearer_auth(access)
            .query(&[("startDate", start), ("endDate", end)])
            .send()
            .await
            .map_err(|e| Error::Transport(format!("egvs request failed: {e}")))
    }
}

/// Decode an egvs response into the most recent reading.
///
/// The provider orders records oldest-to-newest, so the last entry is the
/// most recent; the list is not re-sorted.
async fn decode_latest(response: reqwest::Response) -> Result<Option<GlucoseReading>> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Provider {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: EgvsResponse = response
        .json()
        .await
        .map_err(|e| Error::InvalidResponse(format!("egvs response: {e}")))?;

    match parsed.egvs.into_iter().next_back() {
        Some(record) => Ok(Some(record.try_into()?)),
        None => {
            debug!("no readings in window");
            Ok(None)
        }
    }
}

/// Format the trailing query window the way the provider expects: naive
/// ISO timestamps on the UTC clock, no timezone suffix.
fn trailing_window(window: Duration) -> (String, String) {
    let end = Utc::now();
    let start = end - window;
    (format_naive(start), format_naive(end))
}

fn format_naive(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}
