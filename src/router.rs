use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use warden_observability::{Metrics, PrometheusHandle};

use crate::middleware::pipeline::Pipeline;
use crate::modules::{auth, checkapi};
use crate::state::AppState;
use crate::web::App;

/// Public API: every route runs through the standard pipeline.
pub fn init_router(state: AppState) -> Router {
    let app = App::new(Pipeline::standard(Arc::clone(&state.metrics)));
    let app = checkapi::router::routes(app);
    let app = auth::router::routes(app, &state);
    app.into_router()
}

/// Debug listener: the counter snapshot as JSON and, when a recorder is
/// installed, the Prometheus exposition.
pub fn debug_router(metrics: Arc<Metrics>, prometheus: Option<PrometheusHandle>) -> Router {
    Router::new()
        .route(
            "/debug/vars",
            get(move || {
                let metrics = Arc::clone(&metrics);
                async move { Json(metrics.snapshot()) }
            }),
        )
        .route(
            "/metrics",
            get(move || {
                let prometheus = prometheus.clone();
                async move { render_prometheus(prometheus) }
            }),
        )
        .layer(TraceLayer::new_for_http())
}

fn render_prometheus(handle: Option<PrometheusHandle>) -> Response {
    match handle {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "prometheus recorder not installed").into_response(),
    }
}
