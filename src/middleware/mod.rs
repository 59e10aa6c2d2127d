//! Request pipeline stages and request-level auth helpers.
//!
//! # Modules
//!
//! - [`pipeline`]: the [`Middleware`](pipeline::Middleware) trait and
//!   [`Pipeline`](pipeline::Pipeline) composition
//! - [`logger`]: request id and start/completion logging
//! - [`errors`]: error normalization into the JSON error body
//! - [`metrics`]: request, error and panic counters
//! - [`panics`]: panic containment
//! - [`auth`]: bearer token authentication and role checks for handlers
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::pipeline::Pipeline;
//!
//! let pipeline = Pipeline::standard(metrics);
//! let app = App::new(pipeline).get("/liveness", liveness);
//! ```

pub mod auth;
pub mod errors;
pub mod logger;
pub mod metrics;
pub mod panics;
pub mod pipeline;

pub use auth::{authenticate, authorize, bearer_token};
pub use errors::{Errors, normalize};
pub use logger::{Logger, RequestId};
pub use metrics::MetricsStage;
pub use panics::{PanicError, Panics};
pub use pipeline::{Middleware, Pipeline, PipelineBuilder};
