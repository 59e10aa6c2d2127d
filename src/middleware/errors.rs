use std::sync::Arc;

use axum::{extract::Request, response::IntoResponse};
use tracing::error;
use warden_core::ServiceError;

use crate::middleware::logger::RequestId;
use crate::middleware::panics::PanicError;
use crate::middleware::pipeline::Middleware;
use crate::web::BoxHandler;

/// Maps any error onto what may be sent to the caller.
///
/// A trusted [`ServiceError`] anywhere in the chain is returned unchanged;
/// an untrusted one keeps its kind but gets the kind's canonical message.
/// Anything else becomes `unknown`.
pub fn normalize(err: &anyhow::Error) -> ServiceError {
    match err.chain().find_map(|e| e.downcast_ref::<ServiceError>()) {
        Some(service_error) => service_error.sanitized(),
        None => ServiceError::unknown(),
    }
}

/// Logs every error from downstream and replaces it with a normalized JSON
/// error response.
pub struct Errors;

impl Middleware for Errors {
    fn name(&self) -> &'static str {
        "errors"
    }

    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        Arc::new(move |req: Request| {
            let next = Arc::clone(&next);
            async move {
                let request_id = req.extensions().get::<RequestId>().map(|id| id.0);

                let err = match next.call(req).await {
                    Ok(response) => return Ok(response),
                    Err(err) => err,
                };

                let request_id = request_id.map(|id| id.to_string()).unwrap_or_default();
                match err.downcast_ref::<PanicError>() {
                    Some(panic) => error!(
                        request_id = %request_id,
                        error = %panic,
                        trace = %panic.trace(),
                        "handler panicked"
                    ),
                    None => error!(
                        request_id = %request_id,
                        error = %format!("{err:#}"),
                        "request error"
                    ),
                }

                Ok(normalize(&err).into_response())
            }
        })
    }
}
