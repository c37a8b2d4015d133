use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::api::schemas::ErrorResponse;

/// Errors that can occur when starting or running the mediadrop server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The blob store could not be initialised.
    #[error("storage error: {0}")]
    Blob(#[from] mediadrop_blob::BlobError),

    /// The catalog could not be initialised.
    #[error("catalog error: {0}")]
    Catalog(#[from] mediadrop_catalog::CatalogError),
}

/// Generic message sent in place of error details outside development mode.
pub const GENERIC_INTERNAL_ERROR: &str = "Internal server error";

/// Errors returned to HTTP clients.
///
/// Every variant renders as `{success: false, message}`; internal errors add
/// an `error` field.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    NotFound(String),

    /// A backend failure. `detail` is only set in development mode.
    #[error("{message}")]
    Internal {
        message: String,
        detail: Option<String>,
    },
}

impl ApiError {
    /// Log `cause` and build an internal error, exposing the cause's message
    /// to the client only when `expose` is set.
    pub fn internal(message: impl Into<String>, cause: &dyn std::fmt::Display, expose: bool) -> Self {
        let message = message.into();
        error!(error = %cause, "{message}");
        Self::Internal {
            message,
            detail: expose.then(|| cause.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Internal { message, detail } => ErrorResponse {
                success: false,
                message,
                error: Some(detail.unwrap_or_else(|| GENERIC_INTERNAL_ERROR.to_owned())),
            },
            Self::BadRequest(message)
            | Self::UnsupportedMediaType(message)
            | Self::PayloadTooLarge(message)
            | Self::NotFound(message) => ErrorResponse {
                success: false,
                message,
                error: None,
            },
        };
        (status, axum::Json(body)).into_response()
    }
}
