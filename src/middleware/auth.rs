use axum::http::{HeaderMap, header};
use tracing::warn;
use warden_auth::{Auth, AuthError, Claims};
use warden_core::ServiceError;

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Verifies the bearer token in `headers`.
///
/// A missing or malformed header fails exactly like a bad token.
pub fn authenticate(auth: &Auth, headers: &HeaderMap) -> Result<Claims, ServiceError> {
    let Some(token) = bearer_token(headers) else {
        warn!("missing or malformed authorization header");
        return Err(AuthError::AuthenticationFailed.into());
    };

    auth.verify(token).map_err(ServiceError::from)
}

/// Fails with `forbidden` unless `claims` carries `role`.
pub fn authorize(auth: &Auth, claims: &Claims, role: &str) -> Result<(), ServiceError> {
    auth.authorize(claims, role).map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use warden_auth::roles;
    use warden_auth::testutil::{TEST_KID, test_auth, test_claims};
    use warden_core::ErrorKind;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_authenticate_valid_token() {
        let auth = test_auth();
        let claims = test_claims(&[roles::USER]);
        let token = auth.sign(&claims, TEST_KID).unwrap();

        let verified = authenticate(&auth, &headers(&format!("Bearer {token}"))).unwrap();
        assert_eq!(verified, claims);
    }

    #[test]
    fn test_missing_header_and_bad_token_look_the_same() {
        let auth = test_auth();

        let missing = authenticate(&auth, &HeaderMap::new()).unwrap_err();
        let garbage = authenticate(&auth, &headers("Bearer not.a.token")).unwrap_err();

        assert_eq!(missing, garbage);
        assert_eq!(missing.kind(), ErrorKind::Unauthenticated);
        assert_eq!(missing.public_message(), "authentication failed");
    }

    #[test]
    fn test_authorize_missing_role() {
        let auth = test_auth();
        let claims = test_claims(&[roles::USER]);

        assert!(authorize(&auth, &claims, roles::USER).is_ok());

        let err = authorize(&auth, &claims, roles::ADMIN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }
}
