mod common;

use axum::http::StatusCode;
use common::setup_test_app;
use serde_json::json;

#[tokio::test]
async fn test_liveness() {
    let app = setup_test_app();

    let (status, body) = app.get("/liveness", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK"}));
}

#[tokio::test]
async fn test_readiness() {
    let app = setup_test_app();

    let (status, body) = app.get("/readiness", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK"}));
}

#[tokio::test]
async fn test_testerror_returns_trusted_error_or_ok() {
    let app = setup_test_app();
    let mut saw_error = false;

    for _ in 0..64 {
        let (status, body) = app.get("/testerror", None).await;
        match status {
            StatusCode::OK => assert_eq!(body, json!({"status": "OK"})),
            StatusCode::BAD_REQUEST => {
                saw_error = true;
                assert_eq!(
                    body,
                    json!({"kind": "failed_precondition", "message": "this message is trusted"})
                );
            }
            other => panic!("unexpected status {other}"),
        }
    }

    assert!(saw_error);

    let snapshot = app.metrics().snapshot();
    assert_eq!(snapshot.requests, 64);
    assert_eq!(snapshot.panics, 0);
    assert!(snapshot.errors >= 1);
}

#[tokio::test]
async fn test_testpanic_is_contained() {
    let app = setup_test_app();

    let (status, body) = app.get("/testpanic", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"kind": "unknown", "message": "unknown error"}));

    let snapshot = app.metrics().snapshot();
    assert_eq!(snapshot.requests, 1);
    assert_eq!(snapshot.errors, 1);
    assert_eq!(snapshot.panics, 1);

    // The service keeps answering after a panic.
    let (status, _) = app.get("/liveness", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.metrics().snapshot().requests, 2);
}

#[tokio::test]
async fn test_unknown_route_is_normalized_not_found() {
    let app = setup_test_app();

    let (status, body) = app.get("/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"kind": "not_found", "message": "route not found"}));
}
