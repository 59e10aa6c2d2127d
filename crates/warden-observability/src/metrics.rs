//! Request metrics registry.
//!
//! [`Metrics`] owns four process-lifetime counters updated by the metrics
//! stage of the request pipeline:
//!
//! - `goroutines`: the most recent sample of live tasks on the Tokio runtime
//! - `requests`: requests seen
//! - `errors`: requests whose handler chain returned an error
//! - `panics`: the subset of errors that came from a contained panic
//!
//! The registry is constructed once at startup and shared as `Arc<Metrics>`.
//! Every update is also mirrored to the `metrics` facade so an installed
//! Prometheus recorder exports the same numbers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use tracing::{info, warn};

const GOROUTINES: &str = "warden_goroutines";
const REQUESTS: &str = "warden_requests_total";
const ERRORS: &str = "warden_errors_total";
const PANICS: &str = "warden_panics_total";

/// Atomic request counters.
#[derive(Debug, Default)]
pub struct Metrics {
    goroutines: AtomicU64,
    requests: AtomicU64,
    errors: AtomicU64,
    panics: AtomicU64,
}

/// Point-in-time copy of the counters, as served on `/debug/vars`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub goroutines: u64,
    pub requests: u64,
    pub errors: u64,
    pub panics: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Samples the live task count of the current Tokio runtime and stores
    /// it. Outside a runtime the sample is zero.
    pub fn add_goroutines(&self) -> u64 {
        let live = tokio::runtime::Handle::try_current()
            .map(|handle| handle.metrics().num_alive_tasks() as u64)
            .unwrap_or(0);

        self.record_goroutines(live)
    }

    /// Stores an externally taken concurrency sample.
    pub fn record_goroutines(&self, value: u64) -> u64 {
        self.goroutines.store(value, Ordering::Relaxed);
        gauge!(GOROUTINES).set(value as f64);
        value
    }

    pub fn add_requests(&self) -> u64 {
        counter!(REQUESTS).increment(1);
        self.requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn add_errors(&self) -> u64 {
        counter!(ERRORS).increment(1);
        self.errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn add_panics(&self) -> u64 {
        counter!(PANICS).increment(1);
        self.panics.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            goroutines: self.goroutines.load(Ordering::Relaxed),
            requests: self.requests.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            panics: self.panics.load(Ordering::Relaxed),
        }
    }
}

/// Installs the global Prometheus recorder and starts its upkeep task.
///
/// Must be called inside a Tokio runtime. Returns `None` when a recorder is
/// already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            warn!(error = %e, "prometheus recorder not installed");
            return None;
        }
    };

    describe_gauge!(GOROUTINES, "Live tasks on the runtime at the last sample");
    describe_counter!(REQUESTS, "Requests handled");
    describe_counter!(ERRORS, "Requests that ended in an error");
    describe_counter!(PANICS, "Requests whose handler panicked");

    let upkeep = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep.run_upkeep();
        }
    });

    info!("prometheus recorder installed");
    Some(handle)
}
