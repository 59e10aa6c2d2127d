use std::sync::Arc;

use axum::extract::Request;
use warden_observability::Metrics;

use crate::middleware::panics::PanicError;
use crate::middleware::pipeline::Middleware;
use crate::web::BoxHandler;

/// Counts requests, errors and contained panics, and refreshes the live task
/// sample. Downstream code can reach the registry through the request
/// extensions as `Arc<Metrics>`.
pub struct MetricsStage {
    metrics: Arc<Metrics>,
}

impl MetricsStage {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }
}

impl Middleware for MetricsStage {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        let metrics = Arc::clone(&self.metrics);

        Arc::new(move |mut req: Request| {
            let next = Arc::clone(&next);
            let metrics = Arc::clone(&metrics);
            async move {
                req.extensions_mut().insert(Arc::clone(&metrics));

                // Counted on entry; a dropped request still counts.
                metrics.add_requests();
                metrics.add_goroutines();

                let result = next.call(req).await;

                if let Err(err) = &result {
                    metrics.add_errors();
                    if err.chain().any(|e| e.is::<PanicError>()) {
                        metrics.add_panics();
                    }
                }

                result
            }
        })
    }
}
