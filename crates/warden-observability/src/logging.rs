//! Tracing subscriber setup.
//!
//! Console output is always on (compact text, or JSON lines when
//! `LOG_JSON=true`). When `LOG_DIR` is set, structured JSON logs are also
//! written to daily rolling files there through a non-blocking writer.
//!
//! Filtering follows `RUST_LOG`, falling back to [`DEFAULT_FILTER`].

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use warden_config::LogConfig;

/// Directive used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warden=info,tower_http=info";

/// Base name of the rolling log files.
pub const LOG_FILE_NAME: &str = "warden.json";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber.
///
/// Returns the file writer's guard when file logging is active; keep it alive
/// for the life of the process or buffered lines are lost on exit. Calling
/// this twice leaves the first subscriber in place.
pub fn init_tracing(config: &LogConfig) -> Option<WorkerGuard> {
    let console_layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_filter(env_filter())
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .compact()
            .with_filter(env_filter())
            .boxed()
    };

    let (file_layer, guard) = match &config.dir {
        Some(dir) => match fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_NAME);
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let layer = fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_filter(env_filter());

                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!(
                    "failed to create log directory {}: {e}; logging to console only",
                    dir.display()
                );
                (None, None)
            }
        },
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            json = config.json,
            dir = ?config.dir,
            "tracing initialized"
        );
    }

    guard
}
