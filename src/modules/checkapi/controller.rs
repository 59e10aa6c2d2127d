use axum::extract::Request;
use axum::http::StatusCode;
use serde::Serialize;
use warden_core::ServiceError;

use crate::web::{HandlerResult, respond};

#[derive(Debug, Serialize)]
pub struct Status {
    pub status: &'static str,
}

const OK: Status = Status { status: "OK" };

/// Reports that the process is up.
pub async fn liveness(_req: Request) -> HandlerResult {
    respond(&OK, StatusCode::OK)
}

/// Reports that the process can take traffic.
pub async fn readiness(_req: Request) -> HandlerResult {
    respond(&OK, StatusCode::OK)
}

/// Fails with a trusted error about half the time.
pub async fn test_error(_req: Request) -> HandlerResult {
    if rand::random::<bool>() {
        return Err(ServiceError::failed_precondition("this message is trusted").into());
    }

    respond(&OK, StatusCode::OK)
}

/// Always panics.
pub async fn test_panic(_req: Request) -> HandlerResult {
    panic!("we are panicking!!!")
}
