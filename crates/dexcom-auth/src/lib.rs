//! Dexcom OAuth authentication library
//!
//! Provides the authorization-code flow primitives, token exchange/refresh,
//! and in-memory credential storage for the Dexcom CGM client. This crate is
//! a standalone library with no dependency on any calling surface — it can
//! be tested and used independently.
//!
//! Credential flow:
//! 1. Caller constructs a `CredentialStore` from externally loaded config
//! 2. User authorizes via `authorize::build_authorization_url()`
//! 3. Caller exchanges the redirect code via `token::exchange_code()`
//! 4. Tokens land in the store via `CredentialStore::apply_token_response()`
//! 5. `token::refresh_token()` renews the access token when it expires
//!
//! Token persistence across process restarts is the caller's concern: the
//! store holds process-lifetime state only and is seeded from whatever the
//! caller loaded at startup.

pub mod authorize;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod token;

pub use authorize::build_authorization_url;
pub use constants::*;
pub use credentials::{CredentialStore, Environment};
pub use error::{Error, Result};
pub use token::{TokenResponse, exchange_code, refresh_token};
