//! Common types for the Dexcom CGM client

mod secret;

pub use secret::Secret;
