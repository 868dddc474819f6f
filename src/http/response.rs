//! Response construction.
//!
//! # Responsibilities
//! - JSON bodies for success, disabled and degraded outcomes
//! - `X-Cache` on slot-cached endpoints
//! - `Cache-Control` on content endpoints

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::fmt;

pub const X_CACHE: &str = "x-cache";

/// Whether a response came from the endpoint's cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }

    pub fn is_hit(self) -> bool {
        self == Self::Hit
    }
}

pub fn json(body: Value) -> Response {
    Json(body).into_response()
}

pub fn with_cache_status(mut response: Response, status: CacheStatus) -> Response {
    response
        .headers_mut()
        .insert(X_CACHE, HeaderValue::from_static(status.as_str()));
    response
}

pub fn with_cache_control(mut response: Response, value: &HeaderValue) -> Response {
    response.headers_mut().insert(header::CACHE_CONTROL, value.clone());
    response
}

/// Upstream not configured. A valid terminal state, not an error.
pub fn disabled() -> Response {
    json(json!({
        "status": "disabled",
        "message": "Knowledge base integration is not configured",
    }))
}

/// Upstream unreachable after all retries, masked as HTTP 200.
pub fn degraded(message: &str, error: &dyn fmt::Display) -> Response {
    let mut response = json(json!({
        "status": "degraded",
        "message": message,
        "error": error.to_string(),
    }));
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
