//! Unified error type for homedash.
//!
//! Every failure on the request path funnels into [`Error`], which carries
//! enough context to derive an HTTP status code via [`Error::http_status`]
//! and renders itself through [`IntoResponse`] so handlers can return
//! `Result<T, Error>` directly.

use std::fmt;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type covering all failure modes of the media subsystem.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required configuration is missing (e.g. the media root is unset).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "video", "media root").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller asked for something outside the sandbox.
    ///
    /// The message is always generic so a rejection never reveals whether
    /// the target exists.
    #[error("Access denied")]
    Forbidden,

    /// The requested byte range cannot be served from a file of `size` bytes.
    #[error("Range not satisfiable for resource of {size} bytes")]
    RangeNotSatisfiable {
        /// Total size of the resource.
        size: u64,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Error::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable code included in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration_error",
            Error::NotFound { .. } => "not_found",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden => "forbidden",
            Error::RangeNotSatisfiable { .. } => "range_not_satisfiable",
            Error::Validation(_) => "validation_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.http_status();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self,
                "Server error in API handler"
            );
        }

        if let Error::RangeNotSatisfiable { size } = self {
            return (
                status,
                [(header::CONTENT_RANGE, format!("bytes */{size}"))],
            )
                .into_response();
        }

        let body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}
