//! Error types for the relay server
//!
//! Provides unified error handling using thiserror.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == App Error Enum ==
/// Unified error type for the relay server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed caller input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream API answered with a non-success status or could not be reached
    #[error("{0}")]
    Upstream(String),

    /// Upstream API did not answer within the configured timeout
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// Requested byte range cannot be served from a payload of `size` bytes
    #[error("Range not satisfiable for {size} bytes")]
    RangeNotSatisfiable { size: u64 },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Maps a transport-level reqwest failure onto the upstream taxonomy.
    pub fn from_transport(source: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::UpstreamTimeout(format!("{} request timed out", source))
        } else {
            AppError::Upstream(format!("{} request failed: {}", source, err))
        }
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == Extractor Rejections ==
// Malformed query strings and bodies are caller errors, reported like any
// other invalid request.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            AppError::RangeNotSatisfiable { size } => {
                return (
                    status,
                    [(header::CONTENT_RANGE, format!("bytes */{}", size))],
                )
                    .into_response();
            }
            AppError::InvalidRequest(msg) => msg,
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {}", msg);
                msg
            }
            AppError::UpstreamTimeout(msg) => {
                tracing::warn!("Upstream timeout: {}", msg);
                msg
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                msg
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the relay server.
pub type Result<T> = std::result::Result<T, AppError>;
