//! Token generation for operators and local testing.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use warden_auth::{Auth, AuthSettings, Claims, KeyStore};

/// Inputs for [`generate_token`].
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub keys: PathBuf,
    pub kid: String,
    pub subject: String,
    pub issuer: String,
    pub roles: Vec<String>,
    pub ttl_hours: i64,
}

/// Signs a token from the key folder, verifies it with the same key set and
/// returns it framed between `BEGIN TOKEN` / `END TOKEN` lines.
pub fn generate_token(request: &TokenRequest) -> Result<String> {
    if request.ttl_hours <= 0 {
        bail!("ttl must be at least one hour");
    }

    let mut store = KeyStore::new();
    store
        .load_rsa_keys(&request.keys)
        .with_context(|| format!("loading keys from {}", request.keys.display()))?;

    let auth = Auth::new(AuthSettings::new(&request.issuer), Arc::new(store))
        .context("constructing auth")?;

    let Some(ttl) = Duration::try_hours(request.ttl_hours) else {
        bail!("ttl of {} hours is out of range", request.ttl_hours);
    };

    let claims = Claims::new(
        &request.subject,
        &request.issuer,
        Utc::now(),
        ttl,
        request.roles.clone(),
    )
    .context("building claims")?;

    let token = auth.sign(&claims, &request.kid).context("signing token")?;
    auth.verify(&token).context("verifying freshly signed token")?;

    Ok(frame(&token))
}

pub fn frame(token: &str) -> String {
    format!("-----BEGIN TOKEN-----\n{token}\n-----END TOKEN-----\n")
}

/// Splits a comma separated role list, dropping blanks.
pub fn parse_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}
