//! Configuration validation.
//!
//! Semantic checks that serde cannot express. All problems are reported
//! together rather than stopping at the first.

use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::schema::{GatewayConfig, RetryConfig};

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("upstream.base_url '{0}' is not an absolute http(s) URL")]
    BaseUrl(String),

    #[error("upstream.request_timeout_secs must be at least 1")]
    ZeroUpstreamTimeout,

    #[error("rate_limit.max_requests must be at least 1")]
    ZeroRateLimit,

    #[error("rate_limit.window_secs must be at least 1")]
    ZeroWindow,

    #[error("retries.{class}: max_delay_ms ({max}) is below initial_delay_ms ({initial})")]
    DelayBounds {
        class: &'static str,
        initial: u64,
        max: u64,
    },

    #[error("http.request_timeout_secs ({configured}s) is shorter than the worst-case {class} retry sequence ({required}s)")]
    RequestTimeoutTooShort {
        class: &'static str,
        configured: u64,
        required: u64,
    },

    #[error("http.request_timeout_secs ({configured}s) must exceed the document lookup deadline ({deadline}s)")]
    DocumentDeadline { configured: u64, deadline: u64 },

    #[error("http.cache_control is not a valid header value")]
    CacheControl,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate `config`, returning every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if let Some(base_url) = config.upstream.active_base_url() {
        let valid = Url::parse(base_url)
            .map(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::BaseUrl(base_url.to_owned()));
        }
    }

    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroUpstreamTimeout);
    }

    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroRateLimit);
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroWindow);
    }

    for (class, retry) in [("status", &config.retries.status), ("content", &config.retries.content)] {
        check_retry(class, retry, config, &mut errors);
    }

    // The whole document lookup is cut off at one content retry sequence,
    // which has to fire before the request timeout answers instead.
    let deadline = document_deadline(config);
    if Duration::from_secs(config.http.request_timeout_secs) <= deadline {
        errors.push(ValidationError::DocumentDeadline {
            configured: config.http.request_timeout_secs,
            deadline: deadline.as_secs_f64().ceil() as u64,
        });
    }

    if HeaderValue::from_str(&config.http.cache_control).is_err() {
        errors.push(ValidationError::CacheControl);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Upper bound on a whole `/api/kb/doc` candidate lookup.
pub fn document_deadline(config: &GatewayConfig) -> Duration {
    config
        .retries
        .content
        .policy()
        .worst_case_latency(config.upstream.request_timeout())
}

fn check_retry(
    class: &'static str,
    retry: &RetryConfig,
    config: &GatewayConfig,
    errors: &mut Vec<ValidationError>,
) {
    if retry.max_delay_ms < retry.initial_delay_ms {
        errors.push(ValidationError::DelayBounds {
            class,
            initial: retry.initial_delay_ms,
            max: retry.max_delay_ms,
        });
    }

    let worst_case = retry.policy().worst_case_latency(config.upstream.request_timeout());
    let configured = Duration::from_secs(config.http.request_timeout_secs);
    if configured < worst_case {
        errors.push(ValidationError::RequestTimeoutTooShort {
            class,
            configured: config.http.request_timeout_secs,
            required: worst_case.as_secs_f64().ceil() as u64,
        });
    }
}
