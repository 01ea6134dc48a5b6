//! Dexcom OAuth constants
//!
//! Fixed provider configuration. These values are not secrets — they name
//! the two API deployments and the pre-registered redirect. The actual
//! secrets (client secret, access/refresh tokens) are managed by the
//! credential store.

/// Sandbox deployment (simulated data, no approval required)
pub const SANDBOX_BASE_URL: &str = "https://sandbox-api.dexcom.com";

/// Production deployment (real user data, requires Dexcom approval)
pub const PRODUCTION_BASE_URL: &str = "https://api.dexcom.com";

/// OAuth redirect URI. Fixed and pre-registered with Dexcom; the provider
/// rejects token exchanges whose redirect does not match it exactly.
pub const REDIRECT_URI: &str = "https://localhost:8080/callback";

/// OAuth scope. `offline_access` is what grants the refresh token.
pub const OAUTH_SCOPE: &str = "offline_access";

/// Authorization endpoint path (user-facing login/consent page)
pub const LOGIN_PATH: &str = "/v2/oauth2/login";

/// Token endpoint path for both `authorization_code` and `refresh_token` grants
pub const TOKEN_PATH: &str = "/v2/oauth2/token";

/// Estimated glucose values endpoint path
pub const EGVS_PATH: &str = "/v2/users/self/egvs";
