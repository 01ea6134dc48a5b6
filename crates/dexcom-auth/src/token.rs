//! OAuth token exchange and refresh
//!
//! Handles the two token endpoint interactions:
//! 1. Authorization code exchange (initial flow completion)
//! 2. Token refresh (reactive renewal when the access token expires)
//!
//! Both operations POST form-encoded bodies to `{base}/v2/oauth2/token`
//! with different grant types. Neither touches the credential store — the
//! session applies a successful response, so a failed call leaves stored
//! tokens exactly as they were.

use serde::Deserialize;
use tracing::debug;

use crate::constants::{REDIRECT_URI, TOKEN_PATH};
use crate::credentials::CredentialStore;
use crate::error::{Error, Result};

/// Response from the token endpoint for both exchange and refresh.
///
/// `refresh_token` is optional: the provider may omit it on refresh, in
/// which case the previously stored refresh token remains valid.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Exchange an authorization code for tokens (initial flow completion).
///
/// The code is the opaque single-use value from the provider's redirect.
/// No internal retry: a code that fails once is spent, and the user must
/// re-authorize to obtain a new one.
pub async fn exchange_code(
    client: &reqwest::Client,
    store: &CredentialStore,
    code: &str,
) -> Result<TokenResponse> {
    debug!(environment = store.environment().label(), "exchanging authorization code");
    post_token_request(
        client,
        store,
        &[
            ("client_id", store.client_id()),
            ("client_secret", store.client_secret().expose()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", REDIRECT_URI),
        ],
    )
    .await
}

/// Refresh an access token using a refresh token.
///
/// Called reactively when no access token is stored or the provider
/// rejects the current one with a 401.
pub async fn refresh_token(
    client: &reqwest::Client,
    store: &CredentialStore,
    refresh: &str,
) -> Result<TokenResponse> {
    debug!(environment = store.environment().label(), "refreshing access token");
    post_token_request(
        client,
        store,
        &[
            ("client_id", store.client_id()),
            ("client_secret", store.client_secret().expose()),
            ("refresh_token", refresh),
            ("grant_type", "refresh_token"),
            ("redirect_uri", REDIRECT_URI),
        ],
    )
    .await
}

/// POST a form-encoded grant to the token endpoint and decode the response.
async fn post_token_request(
    client: &reqwest::Client,
    store: &CredentialStore,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    let url = format!("{}{}", store.base_url(), TOKEN_PATH);

    let response = client
        .post(&url)
        .form(form)
        .send()
        .await
        .map_err(|e| Error::Transport(format!("token endpoint request failed: {e}")))?;

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

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::InvalidResponse(format!("token response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Environment;
    use mockito::Matcher;

    fn store_for(server: &mockito::Server) -> CredentialStore {
        CredentialStore::new("cid", "csecret", None, None, Environment::Sandbox)
            .unwrap()
            .with_base_url(server.url())
    }

    #[tokio::test]
    async fn exchange_parses_both_tokens() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/oauth2/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("client_id".into(), "cid".into()),
                Matcher::UrlEncoded("client_secret".into(), "csecret".into()),
                Matcher::UrlEncoded("code".into(), "auth-code-123".into()),
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("redirect_uri".into(), REDIRECT_URI.into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"at_abc","refresh_token":"rt_def"}"#)
            .create_async()
            .await;

        let store = store_for(&server);
        let token = exchange_code(&reqwest::Client::new(), &store, "auth-code-123")
            .await
            .unwrap();

        assert_eq!(token.access_token, "at_abc");
        assert_eq!(token.refresh_token.as_deref(), Some("rt_def"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn exchange_maps_rejection_to_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/oauth2/token")
            .with_status(400)
            .with_body("invalid_grant")
            .create_async()
            .await;

        let store = store_for(&server);
        let err = exchange_code(&reqwest::Client::new(), &store, "spent-code")
            .await
            .unwrap_err();

        match err {
            Error::Provider { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "invalid_grant");
            }
            other => panic!("expected Provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_sends_refresh_grant() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/oauth2/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("refresh_token".into(), "rt_old".into()),
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"at_new","refresh_token":"rt_new"}"#)
            .create_async()
            .await;

        let store = store_for(&server);
        let token = refresh_token(&reqwest::Client::new(), &store, "rt_old")
            .await
            .unwrap();

        assert_eq!(token.access_token, "at_new");
        assert_eq!(token.refresh_token.as_deref(), Some("rt_new"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn refresh_response_may_omit_refresh_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/oauth2/token")
            .with_status(200)
            .with_body(r#"{"access_token":"at_only"}"#)
            .create_async()
            .await;

        let store = store_for(&server);
        let token = refresh_token(&reqwest::Client::new(), &store, "rt_old")
            .await
            .unwrap();

        assert_eq!(token.access_token, "at_only");
        assert_eq!(token.refresh_token, None);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        // Nothing listens on the reserved port 9; connection fails fast
        let store = CredentialStore::new("cid", "csecret", None, None, Environment::Sandbox)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");

        let err = refresh_token(&reqwest::Client::new(), &store, "rt")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn undecodable_success_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/oauth2/token")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let store = store_for(&server);
        let err = exchange_code(&reqwest::Client::new(), &store, "code")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)), "got {err:?}");
    }
}
