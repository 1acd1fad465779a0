// crates/safenet-server/src/error.rs
// ============================================================================
// Module: Request Errors
// Description: Per-request failure taxonomy and its HTTP mapping.
// Purpose: Give every failed request a distinguishable status and body.
// Dependencies: axum, safenet-store-sqlite, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! Client errors (400, 413) report their reason to the caller. Server errors
//! (500) log the detail and answer with a generic message so storage paths
//! and engine messages stay out of responses. All failures share the body
//! `{"status":"error","message":...}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use safenet_store_sqlite::SqliteStoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Message returned for every 500 response.
const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Errors raised while handling a single request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body is not a JSON object or a field cannot be coerced.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    /// The body exceeds the configured size limit.
    #[error("payload too large")]
    PayloadTooLarge,
    /// The record store failed.
    #[error(transparent)]
    Store(#[from] SqliteStoreError),
    /// A page template is missing or unreadable.
    #[error("template error: {0}")]
    Template(String),
    /// Any other server-side failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON body of a failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `"error"`.
    pub status: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        (
            status,
            Json(ErrorBody {
                status: "error",
                message,
            }),
        )
            .into_response()
    }
}
