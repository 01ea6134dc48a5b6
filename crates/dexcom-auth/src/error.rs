//! Error taxonomy for OAuth and data-retrieval operations
//!
//! One enum covers both this crate and the session layer on top of it, so
//! callers match a single taxonomy. The recovery path is part of each
//! variant's meaning: `Configuration` needs a setup fix, `NoRefreshToken` /
//! `NotAuthorized` / `AuthenticationExpired` need the full authorization
//! flow re-run, `Provider` and `Transport` may succeed on a later attempt.

/// Errors from OAuth authentication and authenticated data retrieval.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid client configuration. Fatal — the caller must fix
    /// its setup before any operation can succeed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Refresh was attempted with no refresh token stored. Recoverable only
    /// by re-running the full authorization-code flow.
    #[error("no refresh token stored, full authorization required")]
    NoRefreshToken,

    /// No usable token at all — neither access nor refresh token is stored.
    #[error("not authorized, run the authorization-code flow first")]
    NotAuthorized,

    /// The provider rejected the access token and a refresh-and-retry did
    /// not recover. The remote session is fully invalid; re-authorize.
    #[error("authentication expired: {0}")]
    AuthenticationExpired(String),

    /// Any other non-success HTTP status from the provider. Carries the
    /// status and body for diagnostics; the caller decides whether to
    /// surface it or retry later.
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// Network or connection failure. Not retried internally; the caller
    /// may retry the whole operation later.
    #[error("transport error: {0}")]
    Transport(String),

    /// A success response whose body could not be decoded.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Result alias for auth and session operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_descriptive() {
        assert_eq!(
            Error::Configuration("client id must not be empty".into()).to_string(),
            "configuration error: client id must not be empty"
        );
        assert_eq!(
            Error::NoRefreshToken.to_string(),
            "no refresh token stored, full authorization required"
        );
        assert!(
            Error::Provider {
                status: 404,
                body: "not found".into()
            }
            .to_string()
            .contains("404")
        );
    }

    #[test]
    fn provider_error_carries_status_and_body() {
        let err = Error::Provider {
            status: 503,
            body: "maintenance".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("maintenance"));
    }

    #[test]
    fn debug_includes_variant_name() {
        let err = Error::Transport("connection refused".into());
        let debug = format!("{err:?}");
        assert!(debug.contains("Transport"));
    }
}
