//! Latest-reading retrieval over the Dexcom OAuth session
//!
//! Wraps the auth primitives from `dexcom-auth` into an [`OAuthSession`]
//! that shields callers from token expiry: the session refreshes when no
//! access token is stored and retries exactly once when the provider
//! rejects the current one with a 401. The single consumer-facing call is
//! [`OAuthSession::fetch_latest_reading`], which returns the most recent
//! [`GlucoseReading`] in the trailing window — or `None` when the provider
//! has no data, which is a normal outcome, not an error.
//!
//! Session lifecycle:
//! 1. Caller seeds a `CredentialStore` and constructs the session
//! 2. `authorization_url()` → user consents in a browser out of band
//! 3. `exchange_code()` with the redirect's code → tokens stored
//! 4. `fetch_latest_reading()` at will; expiry is handled internally

pub mod reading;
pub mod session;

pub use dexcom_auth::error::{Error, Result};
pub use reading::{GlucoseReading, Trend, trend_to_arrow};
pub use session::OAuthSession;
