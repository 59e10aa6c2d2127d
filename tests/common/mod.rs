#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;
use warden::router::init_router;
use warden::state::AppState;
use warden_auth::testutil::{TEST_KID, test_auth, test_claims};
use warden_observability::Metrics;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.state.metrics
    }

    pub fn token(&self, roles: &[&str]) -> String {
        self.state.auth.sign(&test_claims(roles), TEST_KID).unwrap()
    }

    /// Sends a GET, optionally with a bearer token, and returns the status
    /// and the body parsed as JSON (`Null` when empty).
    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }
}

pub fn setup_test_app() -> TestApp {
    let state = AppState::new(test_auth(), Metrics::shared());
    let router = init_router(state.clone());
    TestApp { router, state }
}
