//! Token signing and verification configuration.
//!
//! # Environment Variables
//!
//! - `AUTH_KEYS_FOLDER`: directory tree holding `<kid>.pem` RSA private keys (default: `zarf/keys`)
//! - `AUTH_ISSUER`: issuer written into and expected from every token (default: `service project`)
//! - `AUTH_ACTIVE_KID`: key id new tokens are signed with (default: unset)
//! - `AUTH_SIGNING_METHOD`: JWS algorithm, RSA family only (default: `RS256`)
//! - `AUTH_CLOCK_SKEW_SECS`: tolerance applied to `iat`/`nbf`/`exp` checks (default: `0`)

use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    pub keys_folder: PathBuf,
    pub issuer: String,
    pub active_kid: Option<String>,
    pub signing_method: String,
    pub clock_skew_secs: u64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_source<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            keys_folder: get("AUTH_KEYS_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(defaults.keys_folder),
            issuer: get("AUTH_ISSUER").unwrap_or(defaults.issuer),
            active_kid: get("AUTH_ACTIVE_KID").filter(|kid| !kid.trim().is_empty()),
            signing_method: get("AUTH_SIGNING_METHOD").unwrap_or(defaults.signing_method),
            clock_skew_secs: get("AUTH_CLOCK_SKEW_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.clock_skew_secs),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            keys_folder: PathBuf::from("zarf/keys"),
            issuer: "service project".to_string(),
            active_kid: None,
            signing_method: "RS256".to_string(),
            clock_skew_secs: 0,
        }
    }
}
