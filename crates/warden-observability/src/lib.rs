//! Warden observability.
//!
//! - [`logging`]: `tracing` subscriber setup (console plus optional rolling
//!   JSON files)
//! - [`metrics`]: the process-wide request [`Metrics`] registry and the
//!   Prometheus recorder it mirrors into
//!
//! # Examples
//!
//! ```no_run
//! use warden_config::LogConfig;
//! use warden_observability::{Metrics, init_metrics, init_tracing};
//!
//! #[tokio::main]
//! async fn main() {
//!     let _guard = init_tracing(&LogConfig::from_env());
//!     let _prometheus = init_metrics();
//!     let metrics = Metrics::shared();
//!     metrics.add_requests();
//! }
//! ```

pub mod logging;
pub mod metrics;

pub use self::logging::{DEFAULT_FILTER, init_tracing};
pub use self::metrics::{Metrics, MetricsSnapshot, init_metrics};
pub use metrics_exporter_prometheus::PrometheusHandle;
