//! Authorization URL construction
//!
//! First leg of the authorization-code flow: the caller hands this URL to
//! the user (the original deployment opened it in a browser), Dexcom's login
//! page collects consent, and the redirect back to `REDIRECT_URI` carries
//! the single-use authorization code to exchange via [`crate::token`].

use crate::constants::{LOGIN_PATH, OAUTH_SCOPE, REDIRECT_URI};
use crate::credentials::CredentialStore;

/// Build the full authorization URL for the store's environment.
///
/// Deterministic and pure: the URL is a function of the store's base URL
/// and client id plus fixed parameters, and carries no other state.
/// Values are concatenated as-is — the client id and redirect URI are
/// registered with the provider and URL-safe by construction.
pub fn build_authorization_url(store: &CredentialStore) -> String {
    format!(
        "{}{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
        store.base_url(),
        LOGIN_PATH,
        store.client_id(),
        REDIRECT_URI,
        OAUTH_SCOPE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Environment;

    fn store(environment: Environment) -> CredentialStore {
        CredentialStore::new("my-client-id", "my-secret", None, None, environment).unwrap()
    }

    #[test]
    fn url_contains_required_params() {
        let url = build_authorization_url(&store(Environment::Sandbox));

        assert!(url.contains("client_id=my-client-id"));
        assert!(url.contains(&format!("redirect_uri={REDIRECT_URI}")));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=offline_access"));
    }

    #[test]
    fn url_targets_selected_environment() {
        let sandbox = build_authorization_url(&store(Environment::Sandbox));
        assert!(sandbox.starts_with("https://sandbox-api.dexcom.com/v2/oauth2/login?"));

        let production = build_authorization_url(&store(Environment::Production));
        assert!(production.starts_with("https://api.dexcom.com/v2/oauth2/login?"));
    }

    #[test]
    fn url_is_deterministic() {
        let store = store(Environment::Sandbox);
        assert_eq!(
            build_authorization_url(&store),
            build_authorization_url(&store)
        );
    }

    #[test]
    fn url_carries_no_token_state() {
        // Same URL whether or not tokens are already stored — the URL's only
        // variable input is the client id.
        let bare = store(Environment::Sandbox);
        let seeded = CredentialStore::new(
            "my-client-id",
            "my-secret",
            Some("at".into()),
            Some("rt".into()),
            Environment::Sandbox,
        )
        .unwrap();
        assert_eq!(
            build_authorization_url(&bare),
            build_authorization_url(&seeded)
        );
    }
}
