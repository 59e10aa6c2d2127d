//! Error taxonomy for the Warden API.
//!
//! Every failure that reaches the transport boundary is exactly one
//! [`ErrorKind`]. A [`ServiceError`] pairs a kind with a message and a
//! `trusted` flag: trusted messages were written for the caller and may be
//! returned verbatim, untrusted messages are internal detail that is logged
//! but replaced by the kind's canonical message on the wire.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// The closed set of error kinds understood by the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unknown,
    InvalidArgument,
    NotFound,
    AlreadyExists,
    FailedPrecondition,
    Unauthenticated,
    Forbidden,
    ResourceExhausted,
    Aborted,
    Unimplemented,
    Internal,
    Unavailable,
    DeadlineExceeded,
}

impl ErrorKind {
    /// Wire name of the kind, identical to its serde representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::FailedPrecondition => "failed_precondition",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::ResourceExhausted => "resource_exhausted",
            Self::Aborted => "aborted",
            Self::Unimplemented => "unimplemented",
            Self::Internal => "internal",
            Self::Unavailable => "unavailable",
            Self::DeadlineExceeded => "deadline_exceeded",
        }
    }

    /// HTTP status for this kind. The mapping depends on nothing else.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unknown | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidArgument | Self::FailedPrecondition => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists | Self::Aborted => StatusCode::CONFLICT,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
            Self::Unimplemented => StatusCode::NOT_IMPLEMENTED,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Message used on the wire when the original message is not trusted.
    pub const fn canonical_message(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown error",
            Self::InvalidArgument => "invalid argument",
            Self::NotFound => "not found",
            Self::AlreadyExists => "already exists",
            Self::FailedPrecondition => "failed precondition",
            Self::Unauthenticated => "authentication failed",
            Self::Forbidden => "action is not allowed",
            Self::ResourceExhausted => "resource exhausted",
            Self::Aborted => "aborted",
            Self::Unimplemented => "not implemented",
            Self::Internal => "internal error",
            Self::Unavailable => "service unavailable",
            Self::DeadlineExceeded => "deadline exceeded",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured, kind-tagged error.
///
/// Construct trusted errors with [`ServiceError::new`] or the kind helpers
/// (`not_found`, `forbidden`, ...). Use [`ServiceError::untrusted`] or
/// [`ServiceError::internal`] when the message carries internal detail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    kind: ErrorKind,
    message: String,
    trusted: bool,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            trusted: true,
        }
    }

    pub fn untrusted(kind: ErrorKind, detail: impl fmt::Display) -> Self {
        Self {
            kind,
            message: detail.to_string(),
            trusted: false,
        }
    }

    /// The generic error every unrecognised failure is collapsed into.
    pub fn unknown() -> Self {
        Self::new(ErrorKind::Unknown, ErrorKind::Unknown.canonical_message())
    }

    pub fn internal(detail: impl fmt::Display) -> Self {
        Self::untrusted(ErrorKind::Internal, detail)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FailedPrecondition, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The raw message, which may be internal detail. Log it, never send it.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_trusted(&self) -> bool {
        self.trusted
    }

    /// The message that may cross the transport boundary.
    pub fn public_message(&self) -> &str {
        if self.trusted {
            &self.message
        } else {
            self.kind.canonical_message()
        }
    }

    /// Strips internal detail, keeping only what the wire contract allows.
    pub fn sanitized(&self) -> Self {
        Self::new(self.kind, self.public_message())
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "kind": self.kind,
            "message": self.public_message(),
        }));

        (self.status(), body).into_response()
    }
}
