//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use repostats::FetchError;
use serde_json::json;
use thiserror::Error;

/// Error returned by the route handlers, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// `since` is not a non-negative integer.
    #[error("invalid `since` parameter `{0}`: expected a non-negative integer")]
    InvalidSince(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidSince(_) => StatusCode::BAD_REQUEST,
            ApiError::Fetch(e) if e.is_deadline() => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Fetch(FetchError::Locate(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Fetch(FetchError::PoolClosed) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
