//! # Warden Auth
//!
//! Key management and token handling for the Warden API.
//!
//! This crate provides:
//!
//! - [`keystore`]: RSA keys loaded from a folder of `<kid>.pem` files
//! - [`claims`]: the signed token payload and its role check
//! - [`jwt`]: [`Auth`], which signs, verifies and authorizes tokens
//! - [`error`]: load, lookup and verification failures, and their mapping
//!   onto [`warden_core::ServiceError`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden_auth::{Auth, AuthSettings, KeyStore};
//! use warden_config::AuthConfig;
//!
//! let config = AuthConfig::from_env();
//!
//! let mut store = KeyStore::new();
//! store.load_rsa_keys(&config.keys_folder)?;
//!
//! let auth = Auth::new(AuthSettings::from_config(&config), Arc::new(store))?;
//! let claims = auth.verify(&token)?;
//! ```

pub mod claims;
pub mod error;
pub mod jwt;
pub mod keystore;

#[cfg(any(test, feature = "test-utils"))]
pub mod testutil;

pub use claims::{Audience, Claims, roles};
pub use error::{AuthError, KeyStoreError};
pub use jwt::{Auth, AuthSettings};
pub use keystore::{KeyLookup, KeyStore};
