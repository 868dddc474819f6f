//! Upstream error definitions and status classification.

use thiserror::Error;

/// How the proxy treats a failed upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The resource does not exist (404 / 422). Never retried.
    NotFound,
    /// Anything else. Retried through the backoff executor.
    Transient,
}

/// Errors that can occur while talking to the knowledge-base service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered with a non-success status.
    #[error("upstream returned {status} for {path}")]
    Status { status: u16, path: String },

    /// Connection or protocol failure.
    #[error("upstream request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The per-attempt timeout elapsed.
    #[error("upstream request to {path} timed out")]
    Timeout { path: String },

    /// Body was not valid JSON.
    #[error("invalid upstream response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Base URL could not be parsed or extended.
    #[error("invalid upstream url: {0}")]
    Url(String),

    /// HTTP client construction failed.
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),

    /// API key cannot be sent as a header value.
    #[error("api key is not a valid header value")]
    InvalidApiKey,
}

impl UpstreamError {
    pub(crate) fn from_reqwest(path: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { path: path.to_owned() }
        } else if source.is_decode() {
            Self::Decode { path: path.to_owned(), source }
        } else {
            Self::Transport { path: path.to_owned(), source }
        }
    }

    /// HTTP status reported by upstream, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self.status() {
            Some(404 | 422) => ErrorClass::NotFound,
            _ => ErrorClass::Transient,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.class() == ErrorClass::NotFound
    }
}

/// Result type for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;
