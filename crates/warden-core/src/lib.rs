//! # Warden Core
//!
//! Core types shared by every Warden crate.
//!
//! - [`errors`]: the closed error taxonomy ([`ErrorKind`]) and [`ServiceError`],
//!   the structured error that carries a "trusted" flag separating text that is
//!   safe to show a caller from internal detail.
//!
//! # Example
//!
//! ```
//! use warden_core::{ErrorKind, ServiceError};
//!
//! let err = ServiceError::forbidden("action is not allowed");
//! assert_eq!(err.kind(), ErrorKind::Forbidden);
//! assert_eq!(err.public_message(), "action is not allowed");
//!
//! let err = ServiceError::internal("connection refused by 10.0.0.7");
//! assert_eq!(err.public_message(), "internal error");
//! ```

pub mod errors;

// Re-export commonly used types at crate root
pub use errors::{ErrorKind, ServiceError};
