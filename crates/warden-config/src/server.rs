//! HTTP listener configuration.
//!
//! # Environment Variables
//!
//! - `API_HOST`: address the public API binds to (default: `0.0.0.0:3000`)
//! - `DEBUG_HOST`: address the debug/metrics listener binds to (default: `0.0.0.0:3010`)
//! - `SHUTDOWN_TIMEOUT_SECS`: grace period for in-flight requests on shutdown (default: `20`)

use std::env;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub api_host: String,
    pub debug_host: String,
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            debug_host: env::var("DEBUG_HOST").unwrap_or_else(|_| "0.0.0.0:3010".to_string()),
            shutdown_timeout: Duration::from_secs(
                env::var("SHUTDOWN_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(20),
            ),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0:3000".to_string(),
            debug_host: "0.0.0.0:3010".to_string(),
            shutdown_timeout: Duration::from_secs(20),
        }
    }
}
