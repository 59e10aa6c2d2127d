//! Error types for key loading, lookup, signing and verification.

use std::io;

use warden_core::{ErrorKind, ServiceError};

/// Failures raised while loading or resolving keys.
///
/// Load errors name the offending entry (a file path, or the kid when the
/// key was added directly).
#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
    #[error("reading key source {entry}: {source}")]
    Source {
        entry: String,
        #[source]
        source: io::Error,
    },

    #[error("reading key file {entry}: {source}")]
    Read {
        entry: String,
        #[source]
        source: io::Error,
    },

    #[error("key file {entry} exceeds the {limit} byte limit")]
    Oversized { entry: String, limit: u64 },

    #[error("key file {entry} is not a PEM encoded PKCS1 or PKCS8 key")]
    InvalidPem { entry: String },

    #[error("parsing private key {entry}: {reason}")]
    Parse { entry: String, reason: String },

    #[error("key file {entry} is not a valid RSA private key")]
    NotRsa { entry: String },

    #[error("deriving public key for {entry}: {reason}")]
    PublicKey { entry: String, reason: String },

    #[error("key not found: {kid}")]
    KeyNotFound { kid: String },
}

/// Failures surfaced by [`crate::jwt::Auth`].
///
/// Verification has a single failure variant; the concrete
/// cause is only logged.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("action is not allowed: missing role {role}")]
    Forbidden { role: String },

    #[error("invalid claims: {0}")]
    InvalidClaims(String),

    #[error("unsupported signing method {0}")]
    UnsupportedMethod(String),

    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    #[error("signing token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl From<KeyStoreError> for ServiceError {
    fn from(err: KeyStoreError) -> Self {
        match err {
            KeyStoreError::KeyNotFound { .. } => ServiceError::untrusted(ErrorKind::NotFound, err),
            other => ServiceError::internal(other),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed => ServiceError::unauthenticated("authentication failed"),
            AuthError::Forbidden { .. } => ServiceError::forbidden("action is not allowed"),
            AuthError::InvalidClaims(reason) => ServiceError::invalid_argument(reason),
            AuthError::KeyStore(inner) => ServiceError::from(inner),
            other => ServiceError::internal(other),
        }
    }
}
