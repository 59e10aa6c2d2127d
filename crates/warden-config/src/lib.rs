//! # Warden Config
//!
//! Configuration types for the Warden API.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`auth`]: key folder, issuer, signing method and clock skew for token handling
//! - [`server`]: listener addresses and shutdown timing
//! - [`log`]: log output destinations
//!
//! # Example
//!
//! ```ignore
//! use warden_config::{AuthConfig, LogConfig, ServerConfig};
//!
//! // Load all configs from environment
//! let auth_config = AuthConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! let log_config = LogConfig::from_env();
//! ```

pub mod auth;
pub mod log;
pub mod server;

// Re-export commonly used types at crate root
pub use auth::AuthConfig;
pub use log::LogConfig;
pub use server::ServerConfig;
