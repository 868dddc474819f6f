//! Client-facing error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to the caller as a status code plus short message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client exceeded its window quota.
    #[error("Too many requests")]
    RateLimited,

    /// Every candidate id was missing upstream.
    #[error("{0}")]
    NotFound(String),

    /// Upstream still failing after all retries.
    #[error("{0}")]
    Unavailable(String),

    /// Request could not be interpreted.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "statusCode": status.as_u16(),
            "statusMessage": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
