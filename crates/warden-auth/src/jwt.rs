//! Token signing, verification and role authorization.
//!
//! Tokens are compact JWS strings signed with an RSA key from the shared
//! [`KeyLookup`]. The header always carries the signing key id (`kid`) and
//! verification uses nothing but that header field to select a key.
//!
//! Verification walks a fixed sequence of checks:
//!
//! 1. parse the header and require a `kid`
//! 2. resolve the public key for that `kid`
//! 3. check the signature with the configured algorithm
//! 4. check the issuer
//! 5. check `iat <= now <= exp` (and `nbf` when present), widened by the
//!    configured clock skew
//!
//! Every failure collapses into [`AuthError::AuthenticationFailed`]; the
//! concrete reason is logged at `warn` and never returned.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden_auth::{Auth, AuthSettings, Claims, KeyStore, roles};
//!
//! let mut store = KeyStore::new();
//! store.load_rsa_keys("zarf/keys")?;
//!
//! let auth = Auth::new(AuthSettings::new("svc"), Arc::new(store))?;
//! let claims = Claims::new("u1", "svc", Utc::now(), Duration::hours(1), vec![roles::ADMIN.into()])?;
//!
//! let token = auth.sign(&claims, "abc123")?;
//! let verified = auth.verify(&token)?;
//! auth.authorize(&verified, roles::ADMIN)?;
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use tracing::{debug, warn};

use warden_config::AuthConfig;

use crate::claims::Claims;
use crate::error::AuthError;
use crate::keystore::KeyLookup;

/// Signing method used when none is configured.
pub const DEFAULT_SIGNING_METHOD: &str = "RS256";

/// Issuer, algorithm and tolerance an [`Auth`] is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub issuer: String,
    pub signing_method: String,
    pub clock_skew_secs: u64,
}

impl AuthSettings {
    /// RS256 settings for `issuer` with no clock skew.
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            signing_method: DEFAULT_SIGNING_METHOD.to_string(),
            clock_skew_secs: 0,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            signing_method: config.signing_method.clone(),
            clock_skew_secs: config.clock_skew_secs,
        }
    }

    pub fn with_signing_method(mut self, method: impl Into<String>) -> Self {
        self.signing_method = method.into();
        self
    }

    pub fn with_clock_skew(mut self, secs: u64) -> Self {
        self.clock_skew_secs = secs;
        self
    }
}

/// Why a token was rejected. Logged, never returned.
#[derive(Debug)]
enum VerifyFailure {
    MalformedHeader(jsonwebtoken::errors::Error),
    MissingKid,
    UnknownKid,
    KeyDecode(jsonwebtoken::errors::Error),
    Signature(jsonwebtoken::errors::Error),
    IssuerMismatch { found: String },
    NotYetValid,
    Expired,
}

impl fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader(e) => write!(f, "malformed token header: {e}"),
            Self::MissingKid => f.write_str("missing kid in token header"),
            Self::UnknownKid => f.write_str("unknown kid"),
            Self::KeyDecode(e) => write!(f, "decoding public key: {e}"),
            Self::Signature(e) => write!(f, "signature check: {e}"),
            Self::IssuerMismatch { found } => write!(f, "issuer mismatch: {found}"),
            Self::NotYetValid => f.write_str("token not yet valid"),
            Self::Expired => f.write_str("token expired"),
        }
    }
}

/// Signs, verifies and authorizes tokens against a shared key set.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct Auth {
    keys: Arc<dyn KeyLookup>,
    algorithm: Algorithm,
    validation: Validation,
    issuer: String,
    clock_skew: i64,
}

impl Auth {
    /// Builds an `Auth` over `keys`.
    ///
    /// Fails when the signing method is not an RSA algorithm or the issuer is
    /// empty.
    pub fn new(settings: AuthSettings, keys: Arc<dyn KeyLookup>) -> Result<Self, AuthError> {
        let algorithm = parse_signing_method(&settings.signing_method)?;

        if settings.issuer.trim().is_empty() {
            return Err(AuthError::InvalidClaims(
                "issuer must not be empty".to_string(),
            ));
        }

        // Issuer and time window are checked by hand after decoding.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Ok(Self {
            keys,
            algorithm,
            validation,
            issuer: settings.issuer,
            clock_skew: i64::try_from(settings.clock_skew_secs).unwrap_or(i64::MAX),
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Signs `claims` with the private key registered under `kid`.
    ///
    /// The claims must name a subject and issuer and expire after they were
    /// issued; otherwise signing fails before any key is touched.
    pub fn sign(&self, claims: &Claims, kid: &str) -> Result<String, AuthError> {
        validate_claims(claims)?;

        let private_pem = self.keys.private_key(kid)?;
        let key = EncodingKey::from_rsa_pem(private_pem.trim().as_bytes())?;

        let mut header = Header::new(self.algorithm);
        header.kid = Some(kid.to_string());

        let token = encode(&header, claims, &key)?;
        debug!(kid = %kid, sub = %claims.sub, "token signed");
        Ok(token)
    }

    /// Verifies `token` against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies `token` as of `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut kid = None;

        match self.check(token, now.timestamp(), &mut kid) {
            Ok(claims) => Ok(claims),
            Err(reason) => {
                warn!(
                    kid = kid.as_deref().unwrap_or("-"),
                    reason = %reason,
                    "token verification failed"
                );
                Err(AuthError::AuthenticationFailed)
            }
        }
    }

    /// Fails with [`AuthError::Forbidden`] unless `claims` carries `role`.
    pub fn authorize(&self, claims: &Claims, role: &str) -> Result<(), AuthError> {
        if claims.has_role(role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                role: role.to_string(),
            })
        }
    }

    fn check(
        &self,
        token: &str,
        now: i64,
        kid_out: &mut Option<String>,
    ) -> Result<Claims, VerifyFailure> {
        let header = decode_header(token).map_err(VerifyFailure::MalformedHeader)?;
        let kid = header.kid.ok_or(VerifyFailure::MissingKid)?;
        let kid = kid_out.insert(kid);

        let public_pem = self
            .keys
            .public_key(kid)
            .map_err(|_| VerifyFailure::UnknownKid)?;
        let key =
            DecodingKey::from_rsa_pem(public_pem.as_bytes()).map_err(VerifyFailure::KeyDecode)?;

        let claims = decode::<Claims>(token, &key, &self.validation)
            .map_err(VerifyFailure::Signature)?
            .claims;

        if claims.iss != self.issuer {
            return Err(VerifyFailure::IssuerMismatch {
                found: claims.iss,
            });
        }

        let earliest = claims.nbf.map_or(claims.iat, |nbf| nbf.max(claims.iat));
        if now.saturating_add(self.clock_skew) < earliest {
            return Err(VerifyFailure::NotYetValid);
        }
        if now.saturating_sub(self.clock_skew) > claims.exp {
            return Err(VerifyFailure::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("clock_skew", &self.clock_skew)
            .finish_non_exhaustive()
    }
}

fn parse_signing_method(method: &str) -> Result<Algorithm, AuthError> {
    let algorithm = Algorithm::from_str(method.trim())
        .map_err(|_| AuthError::UnsupportedMethod(method.to_string()))?;

    match algorithm {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => Ok(algorithm),
        _ => Err(AuthError::UnsupportedMethod(method.to_string())),
    }
}

fn validate_claims(claims: &Claims) -> Result<(), AuthError> {
    if claims.sub.trim().is_empty() {
        return Err(AuthError::InvalidClaims("subject must not be empty".into()));
    }
    if claims.iss.trim().is_empty() {
        return Err(AuthError::InvalidClaims("issuer must not be empty".into()));
    }
    if claims.exp <= claims.iat {
        return Err(AuthError::InvalidClaims(
            "expiry must be after issued-at".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{Audience, roles};
    use crate::keystore::KeyStore;
    use crate::testutil::{
        TEST_ISSUER, TEST_KID, generate_private_key_pem, test_auth, test_claims, test_keystore,
        test_private_key_pkcs8_pem,
    };
    use chrono::{Duration, TimeZone};

    fn at(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).unwrap()
    }

    fn claims_at(issued_at: DateTime<Utc>, ttl: Duration, roles: &[&str]) -> Claims {
        Claims::new(
            "u1",
            TEST_ISSUER,
            issued_at,
            ttl,
            roles.iter().map(|r| r.to_string()).collect(),
        )
        .unwrap()
    }

    fn is_auth_failure(result: Result<Claims, AuthError>) -> bool {
        matches!(result, Err(AuthError::AuthenticationFailed))
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let auth = test_auth();
        let claims = test_claims(&[roles::USER]);

        let token = auth.sign(&claims, TEST_KID).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let verified = auth.verify(&token).unwrap();
        assert_eq!(verified, claims);
    }

    #[test]
    fn test_verify_accepts_audience_array() {
        let auth = test_auth();
        let mut claims = test_claims(&[]);
        claims.aud = Some(Audience::Many(vec!["api".into(), "admin".into()]));

        let token = auth.sign(&claims, TEST_KID).unwrap();
        let verified = auth.verify(&token).unwrap();
        assert_eq!(verified.aud, claims.aud);
    }

    #[test]
    fn test_header_carries_kid_and_algorithm() {
        let auth = test_auth();
        let token = auth.sign(&test_claims(&[]), TEST_KID).unwrap();

        let header = decode_header(&token).unwrap();
        assert_eq!(header.kid.as_deref(), Some(TEST_KID));
        assert_eq!(header.alg, Algorithm::RS256);
    }

    #[test]
    fn test_admin_scenario() {
        let auth = test_auth();
        let t = at(1_700_000_000);
        let claims = claims_at(t, Duration::hours(1), &[roles::ADMIN]);

        let token = auth.sign(&claims, "abc123").unwrap();
        let verified = auth.verify_at(&token, t + Duration::minutes(5)).unwrap();

        assert_eq!(verified, claims);
        assert!(verified.has_role("ADMIN"));
        assert!(!verified.has_role("USER"));
        assert!(auth.authorize(&verified, roles::ADMIN).is_ok());
        assert!(matches!(
            auth.authorize(&verified, roles::USER),
            Err(AuthError::Forbidden { ref role }) if role == "USER"
        ));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let auth = test_auth();
        let t = at(1_700_000_000);
        let claims = claims_at(t, Duration::hours(1), &[]);
        let token = auth.sign(&claims, TEST_KID).unwrap();

        assert!(auth.verify_at(&token, t).is_ok());
        assert!(auth.verify_at(&token, t + Duration::hours(1)).is_ok());
        assert!(is_auth_failure(auth.verify_at(&token, t - Duration::seconds(1))));
        assert!(is_auth_failure(
            auth.verify_at(&token, t + Duration::hours(1) + Duration::seconds(1))
        ));
    }

    #[test]
    fn test_clock_skew_widens_window() {
        let settings = AuthSettings::new(TEST_ISSUER).with_clock_skew(30);
        let auth = Auth::new(settings, Arc::new(test_keystore())).unwrap();

        let t = at(1_700_000_000);
        let token = auth
            .sign(&claims_at(t, Duration::hours(1), &[]), TEST_KID)
            .unwrap();

        assert!(auth.verify_at(&token, t - Duration::seconds(30)).is_ok());
        assert!(auth.verify_at(&token, t + Duration::hours(1) + Duration::seconds(30)).is_ok());
        assert!(is_auth_failure(auth.verify_at(&token, t - Duration::seconds(31))));
    }

    #[test]
    fn test_not_before_is_enforced() {
        let auth = test_auth();
        let t = at(1_700_000_000);
        let mut claims = claims_at(t, Duration::hours(1), &[]);
        claims.nbf = Some(t.timestamp() + 600);

        let token = auth.sign(&claims, TEST_KID).unwrap();

        assert!(is_auth_failure(auth.verify_at(&token, t + Duration::minutes(5))));
        assert!(auth.verify_at(&token, t + Duration::minutes(10)).is_ok());
    }

    #[test]
    fn test_failures_are_indistinguishable() {
        let auth = test_auth();
        let t = at(1_700_000_000);
        let now = t + Duration::minutes(1);

        // Unknown kid: signed by a store the verifier has never seen.
        let mut other_store = KeyStore::new();
        other_store
            .add_private_pem("zzz999", generate_private_key_pem())
            .unwrap();
        let other = Auth::new(AuthSettings::new(TEST_ISSUER), Arc::new(other_store)).unwrap();
        let unknown_kid = other
            .sign(&claims_at(t, Duration::hours(1), &[]), "zzz999")
            .unwrap();

        // Wrong issuer.
        let mut foreign = claims_at(t, Duration::hours(1), &[]);
        foreign.iss = "someone-else".to_string();
        let wrong_issuer = auth.sign(&foreign, TEST_KID).unwrap();

        // Expired window.
        let expired = auth
            .sign(&claims_at(t - Duration::hours(2), Duration::hours(1), &[]), TEST_KID)
            .unwrap();

        // Tampered: payload of one token spliced onto the signature of another.
        let original = auth
            .sign(&claims_at(t, Duration::hours(1), &[roles::USER]), TEST_KID)
            .unwrap();
        let elevated = auth
            .sign(&claims_at(t, Duration::hours(1), &[roles::ADMIN]), TEST_KID)
            .unwrap();
        let orig_parts: Vec<&str> = original.split('.').collect();
        let elev_parts: Vec<&str> = elevated.split('.').collect();
        let tampered = format!("{}.{}.{}", orig_parts[0], elev_parts[1], orig_parts[2]);

        let results: Vec<String> = [unknown_kid, wrong_issuer, expired, tampered]
            .iter()
            .map(|token| {
                let err = auth.verify_at(token, now).unwrap_err();
                assert!(matches!(err, AuthError::AuthenticationFailed));
                err.to_string()
            })
            .collect();

        assert!(results.iter().all(|msg| msg == "authentication failed"));
    }

    #[test]
    fn test_missing_kid_rejected_before_signature_check() {
        let auth = test_auth();
        let claims = test_claims(&[]);

        let key = EncodingKey::from_rsa_pem(crate::testutil::TEST_PRIVATE_KEY_PEM.as_bytes())
            .unwrap();
        let token = encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap();

        assert!(is_auth_failure(auth.verify(&token)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let auth = test_auth();
        assert!(is_auth_failure(auth.verify("")));
        assert!(is_auth_failure(auth.verify("not-a-token")));
        assert!(is_auth_failure(auth.verify("a.b.c")));
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let auth = test_auth();
        let ps = Auth::new(
            AuthSettings::new(TEST_ISSUER).with_signing_method("PS256"),
            Arc::new(test_keystore()),
        )
        .unwrap();

        let token = ps.sign(&test_claims(&[]), TEST_KID).unwrap();
        assert!(ps.verify(&token).is_ok());
        assert!(is_auth_failure(auth.verify(&token)));
    }

    #[test]
    fn test_sign_unknown_kid_fails() {
        let auth = test_auth();
        let err = auth.sign(&test_claims(&[]), "missing").unwrap_err();
        assert!(matches!(
            err,
            AuthError::KeyStore(crate::error::KeyStoreError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_sign_rejects_invalid_claims() {
        let auth = test_auth();
        let t = at(1_700_000_000);

        let inverted = claims_at(t, Duration::seconds(0), &[]);
        assert!(matches!(
            auth.sign(&inverted, TEST_KID),
            Err(AuthError::InvalidClaims(_))
        ));

        let mut anonymous = claims_at(t, Duration::hours(1), &[]);
        anonymous.sub = String::new();
        assert!(matches!(
            auth.sign(&anonymous, TEST_KID),
            Err(AuthError::InvalidClaims(_))
        ));

        let mut no_issuer = claims_at(t, Duration::hours(1), &[]);
        no_issuer.iss = " ".to_string();
        assert!(matches!(
            auth.sign(&no_issuer, TEST_KID),
            Err(AuthError::InvalidClaims(_))
        ));
    }

    #[test]
    fn test_unsupported_signing_methods() {
        for method in ["HS256", "ES256", "EdDSA", "none", "rs256"] {
            let settings = AuthSettings::new(TEST_ISSUER).with_signing_method(method);
            let result = Auth::new(settings, Arc::new(test_keystore()));
            assert!(
                matches!(result, Err(AuthError::UnsupportedMethod(_))),
                "{method} should be rejected"
            );
        }
    }

    #[test]
    fn test_settings_from_config() {
        let config = AuthConfig {
            issuer: "service project".to_string(),
            signing_method: "RS512".to_string(),
            clock_skew_secs: 5,
            ..AuthConfig::default()
        };

        let settings = AuthSettings::from_config(&config);
        let auth = Auth::new(settings, Arc::new(test_keystore())).unwrap();

        assert_eq!(auth.issuer(), "service project");
        assert_eq!(auth.algorithm(), Algorithm::RS512);
    }

    #[test]
    fn test_pkcs8_key_signs_and_verifies() {
        let mut store = KeyStore::new();
        store.add_private_pem("p8", test_private_key_pkcs8_pem()).unwrap();
        let auth = Auth::new(AuthSettings::new(TEST_ISSUER), Arc::new(store)).unwrap();

        let claims = test_claims(&[roles::ADMIN]);
        let token = auth.sign(&claims, "p8").unwrap();
        assert_eq!(auth.verify(&token).unwrap(), claims);
    }

    #[test]
    fn test_rotated_keys_both_verify() {
        let mut store = test_keystore();
        store.add_private_pem("next", generate_private_key_pem()).unwrap();
        let auth = test_auth_over(store);

        let old = auth.sign(&test_claims(&[]), TEST_KID).unwrap();
        let new = auth.sign(&test_claims(&[]), "next").unwrap();

        assert!(auth.verify(&old).is_ok());
        assert!(auth.verify(&new).is_ok());
    }

    #[test]
    fn test_shared_store_across_instances() {
        let store: Arc<dyn KeyLookup> = Arc::new(test_keystore());
        let signer = Auth::new(AuthSettings::new(TEST_ISSUER), Arc::clone(&store)).unwrap();
        let verifier = Auth::new(AuthSettings::new(TEST_ISSUER), store).unwrap();

        let claims = test_claims(&[roles::USER]);
        let token = signer.sign(&claims, TEST_KID).unwrap();
        assert_eq!(verifier.verify(&token).unwrap(), claims);
    }

    #[test]
    fn test_concurrent_verification() {
        let auth = Arc::new(test_auth());
        let token = auth.sign(&test_claims(&[roles::USER]), TEST_KID).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let auth = Arc::clone(&auth);
                let token = token.clone();
                std::thread::spawn(move || auth.verify(&token).is_ok())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    fn test_auth_over(store: KeyStore) -> Auth {
        Auth::new(AuthSettings::new(TEST_ISSUER), Arc::new(store)).unwrap()
    }
}
