//! Token claims and the role membership check.
//!
//! [`Claims`] is the signed payload of every Warden token. Apart from the
//! role predicate it is passive data: signature, issuer and validity window
//! checks all live in [`crate::jwt::Auth`].

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Role names used by the bundled routes.
pub mod roles {
    pub const ADMIN: &str = "ADMIN";
    pub const USER: &str = "USER";
}

/// The `aud` claim, which RFC 7519 allows as a single string or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Self::Single(aud) => aud == audience,
            Self::Many(auds) => auds.iter().any(|a| a == audience),
        }
    }
}

/// JWT claims identifying a subject, its issuer, validity window and roles.
///
/// # Fields
///
/// - `sub`: subject the token was issued to
/// - `iss`: issuer identity, checked against the verifier's configured issuer
/// - `iat` / `exp`: validity window as Unix timestamps (seconds)
/// - `roles`: granted roles; only membership matters, order is preserved as issued
/// - `aud`, `nbf`, `jti`: optional registered claims, omitted from the payload when unset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Builds claims valid from `issued_at` for `ttl`.
    ///
    /// Fails with [`AuthError::InvalidClaims`] when the expiry falls outside
    /// the representable time range.
    pub fn new(
        subject: impl Into<String>,
        issuer: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        roles: Vec<String>,
    ) -> Result<Self, AuthError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::InvalidClaims("ttl is out of range".to_string()))?;

        Ok(Self {
            sub: subject.into(),
            iss: issuer.into(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            roles,
            aud: None,
            nbf: None,
            jti: None,
        })
    }

    /// Reports whether `role` is a literal member of the role list.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}
