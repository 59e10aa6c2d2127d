//! # Warden CLI
//!
//! Key and token tooling used by the `warden-cli` binary.
//!
//! - [`keys`]: generate an RSA private key into a key folder
//! - [`token`]: sign a token with a key from a key folder and check it
//!
//! ## Usage
//!
//! ```ignore
//! use warden_cli::{keys, token};
//!
//! let key = keys::generate_key("zarf/keys", None, 2048)?;
//! let framed = token::generate_token(&token::TokenRequest {
//!     keys: "zarf/keys".into(),
//!     kid: key.kid,
//!     subject: "57348329".into(),
//!     issuer: "service project".into(),
//!     roles: vec!["ADMIN".into()],
//!     ttl_hours: 8760,
//! })?;
//! ```

pub mod keys;
pub mod token;
