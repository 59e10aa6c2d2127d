//! Request entry point.
//!
//! Handlers are plain async functions from a [`Request`] to a
//! [`HandlerResult`]; returning `Err` hands the failure to the middleware
//! pipeline instead of writing a response. [`App`] composes every handler
//! with the pipeline once, at registration, and mounts it on an axum
//! [`Router`].

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{MethodFilter, on},
};
use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tracing::error;
use warden_core::ServiceError;

use crate::middleware::errors::normalize;
use crate::middleware::pipeline::Pipeline;

/// Outcome of a handler: a response, or an error for the pipeline to handle.
pub type HandlerResult = Result<Response, anyhow::Error>;

/// A request handler.
///
/// Implemented for every `Fn(Request) -> impl Future<Output = HandlerResult>`,
/// so closures and async fns qualify directly.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, HandlerResult> {
        self(req).boxed()
    }
}

/// Type-erased, shareable handler.
pub type BoxHandler = Arc<dyn Handler>;

/// Encodes `data` as a JSON response with `status`.
///
/// `204 No Content` is sent with no body.
pub fn respond<T: Serialize>(data: &T, status: StatusCode) -> HandlerResult {
    if status == StatusCode::NO_CONTENT {
        return Ok(status.into_response());
    }

    let body = serde_json::to_vec(data)?;
    Ok((
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response())
}

/// Binds `(method, path)` pairs to pipeline-wrapped handlers.
pub struct App {
    router: Router,
    pipeline: Pipeline,
}

impl App {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            router: Router::new(),
            pipeline,
        }
    }

    /// Registers `handler` for `method` on `path`, composed with the pipeline.
    pub fn handle<H: Handler>(mut self, method: MethodFilter, path: &str, handler: H) -> Self {
        let handler = self.pipeline.wrap(Arc::new(handler));

        self.router = self
            .router
            .route(path, on(method, move |req: Request| dispatch(Arc::clone(&handler), req)));
        self
    }

    pub fn get<H: Handler>(self, path: &str, handler: H) -> Self {
        self.handle(MethodFilter::GET, path, handler)
    }

    pub fn post<H: Handler>(self, path: &str, handler: H) -> Self {
        self.handle(MethodFilter::POST, path, handler)
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Finishes the app. Unmatched routes run through the pipeline too and
    /// answer with a `not_found` error.
    pub fn into_router(self) -> Router {
        let fallback = self.pipeline.wrap(Arc::new(|_req: Request| async {
            Err::<Response, _>(ServiceError::not_found("route not found").into())
        }));

        self.router
            .fallback(move |req: Request| dispatch(Arc::clone(&fallback), req))
    }
}

// Turns whatever escaped the pipeline into a response. With the standard
// pipeline errors never get this far.
async fn dispatch(handler: BoxHandler, req: Request) -> Response {
    match handler.call(req).await {
        Ok(response) => response,
        Err(err) => {
            error!(error = %format!("{err:#}"), "unhandled error escaped the pipeline");
            normalize(&err).into_response()
        }
    }
}
