use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::middleware::pipeline::Middleware;
use crate::web::BoxHandler;

/// Per-request id, inserted into the request extensions by [`Logger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

/// Logs the start and completion of every request.
///
/// Completion is logged at `info` for 2xx, `warn` for 4xx and `error` for
/// 5xx. Everything downstream runs inside a `request` span carrying the
/// request id.
pub struct Logger;

impl Middleware for Logger {
    fn name(&self) -> &'static str {
        "logger"
    }

    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        Arc::new(move |mut req: Request| {
            let next = Arc::clone(&next);
            async move {
                let start = Instant::now();
                let method = req.method().clone();
                let path = req.uri().path().to_string();
                let request_id = Uuid::new_v4();
                req.extensions_mut().insert(RequestId(request_id));

                let span = info_span!(
                    "request",
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                );

                async move {
                    info!("request started");

                    let result = next.call(req).await;
                    let latency_ms = start.elapsed().as_millis() as u64;

                    match &result {
                        Ok(response) => {
                            let status = response.status().as_u16();
                            match status {
                                400..=499 => warn!(status, latency_ms, "client error"),
                                500..=599 => error!(status, latency_ms, "server error"),
                                _ => info!(status, latency_ms, "request completed"),
                            }
                        }
                        Err(err) => {
                            error!(error = %err, latency_ms, "request failed without a response");
                        }
                    }

                    result
                }
                .instrument(span)
                .await
            }
        })
    }
}
