mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::setup_test_app;
use serde_json::json;
use warden_auth::testutil::{TEST_ISSUER, TEST_KID};
use warden_auth::{Claims, roles};

fn unauthenticated() -> serde_json::Value {
    json!({"kind": "unauthenticated", "message": "authentication failed"})
}

#[tokio::test]
async fn test_whoami_returns_claims() {
    let app = setup_test_app();
    let token = app.token(&[roles::USER]);

    let (status, body) = app.get("/auth/whoami", Some(token.as_str())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sub"], "u1");
    assert_eq!(body["iss"], TEST_ISSUER);
    assert_eq!(body["roles"], json!(["USER"]));
}

#[tokio::test]
async fn test_whoami_without_token() {
    let app = setup_test_app();

    let (status, body) = app.get("/auth/whoami", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unauthenticated());
}

#[tokio::test]
async fn test_rejections_are_indistinguishable_on_the_wire() {
    let app = setup_test_app();

    let mut wrong_issuer = Claims::new("u1", "elsewhere", Utc::now(), Duration::hours(1), vec![]).unwrap();
    wrong_issuer.roles.push(roles::ADMIN.to_string());
    let wrong_issuer = app.state.auth.sign(&wrong_issuer, TEST_KID).unwrap();

    let expired = Claims::new(
        "u1",
        TEST_ISSUER,
        Utc::now() - Duration::hours(2),
        Duration::hours(1),
        vec![],
    )
    .unwrap();
    let expired = app.state.auth.sign(&expired, TEST_KID).unwrap();

    let valid = app.token(&[]);
    let mut tampered = valid.clone();
    tampered.truncate(valid.len() - 4);
    tampered.push_str("AAAA");

    for token in [wrong_issuer.as_str(), expired.as_str(), tampered.as_str(), "garbage"] {
        let (status, body) = app.get("/auth/whoami", Some(token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, unauthenticated());
    }
}

#[tokio::test]
async fn test_admin_route_requires_admin_role() {
    let app = setup_test_app();

    let user = app.token(&[roles::USER]);
    let (status, body) = app.get("/auth/admin", Some(user.as_str())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"kind": "forbidden", "message": "action is not allowed"}));

    let admin = app.token(&[roles::ADMIN]);
    let (status, body) = app.get("/auth/admin", Some(admin.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roles"], json!(["ADMIN"]));
}

#[tokio::test]
async fn test_auth_failures_are_counted_as_errors() {
    let app = setup_test_app();

    app.get("/auth/whoami", None).await;
    app.get("/auth/admin", Some(app.token(&[]).as_str())).await;

    let snapshot = app.metrics().snapshot();
    assert_eq!(snapshot.requests, 2);
    assert_eq!(snapshot.errors, 2);
    assert_eq!(snapshot.panics, 0);
}
