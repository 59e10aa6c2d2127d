//! Middleware composition.
//!
//! A [`Middleware`] takes the next handler in the chain and returns a new
//! handler that runs code before it, after it, or both. A [`Pipeline`] is an
//! ordered list of stages, outermost first, applied to each route handler
//! once at registration time.
//!
//! The standard order is:
//!
//! 1. **Logger** - request id, start/completion lines
//! 2. **Errors** - turns any error into a normalized JSON response
//! 3. **Metrics** - request, error and panic counters
//! 4. **Panics** - converts a handler panic into an error
//!
//! Panics sits inside Metrics so a contained panic is counted as both an
//! error and a panic; Errors sits outside Metrics so counting sees the raw
//! error before it is replaced by a response.

use std::sync::Arc;

use warden_observability::Metrics;

use crate::middleware::errors::Errors;
use crate::middleware::logger::Logger;
use crate::middleware::metrics::MetricsStage;
use crate::middleware::panics::Panics;
use crate::web::BoxHandler;

/// A stage that wraps a handler.
pub trait Middleware: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Returns a handler that runs this stage around `next`.
    ///
    /// Errors returned by `next` must be passed on unless the stage means to
    /// replace them.
    fn wrap(&self, next: BoxHandler) -> BoxHandler;
}

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An ordered, immutable list of stages.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// `logger -> errors -> metrics -> panics -> handler`.
    pub fn standard(metrics: Arc<Metrics>) -> Self {
        Self::builder()
            .stage(Logger)
            .stage(Errors)
            .stage(MetricsStage::new(metrics))
            .stage(Panics)
            .build()
    }

    /// Composes `handler` with every stage; the first stage ends up
    /// outermost.
    pub fn wrap(&self, handler: BoxHandler) -> BoxHandler {
        self.stages
            .iter()
            .rev()
            .fold(handler, |next, stage| stage.wrap(next))
    }

    /// Stage names, outermost first.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// Builder for [`Pipeline`]. Stages are added outermost first.
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}
