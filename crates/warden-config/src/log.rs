//! Log output configuration.
//!
//! - `LOG_DIR`: when set, structured JSON logs are also written to daily rolling files there
//! - `LOG_JSON`: `true` switches console output to JSON lines (default: `false`)

use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub dir: Option<PathBuf>,
    pub json: bool,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            dir: env::var("LOG_DIR")
                .ok()
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
            json: env::var("LOG_JSON")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        }
    }
}
