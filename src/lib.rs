//! # Warden API
//!
//! The authentication core of an HTTP service: RSA-signed bearer tokens
//! checked against a key set loaded at startup, behind a fixed middleware
//! pipeline that contains panics, counts requests and normalizes errors.
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── warden-core/           # Error taxonomy (ErrorKind, ServiceError)
//! ├── warden-config/         # Environment-driven configuration
//! ├── warden-auth/           # KeyStore, Claims, Auth (sign/verify/authorize)
//! ├── warden-observability/  # Tracing setup, Metrics registry, Prometheus
//! └── warden-cli/            # genkey / gentoken admin tooling
//! src/
//! ├── web/                   # Handler trait, App, respond
//! ├── middleware/            # Pipeline and its stages, auth helpers
//! ├── modules/               # Route modules (checkapi, auth)
//! ├── router.rs              # API and debug routers
//! └── state.rs               # Shared handler state
//! ```
//!
//! ## Request flow
//!
//! ```text
//! logger -> errors -> metrics -> panics -> handler
//! ```
//!
//! A handler returns `Result<Response, anyhow::Error>`. A panic is turned
//! into a [`PanicError`](middleware::PanicError) by the panics stage, counted
//! by the metrics stage, and rendered by the errors stage exactly like a
//! returned error. Only trusted [`ServiceError`](warden_core::ServiceError)
//! messages reach the wire.
//!
//! ## Environment Variables
//!
//! ```bash
//! AUTH_KEYS_FOLDER=zarf/keys
//! AUTH_ISSUER="service project"
//! AUTH_SIGNING_METHOD=RS256
//! API_HOST=0.0.0.0:3000
//! DEBUG_HOST=0.0.0.0:3010
//! ```

pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod web;

// Re-export workspace crates for convenience
pub use warden_auth;
pub use warden_config;
pub use warden_core;
pub use warden_observability;
