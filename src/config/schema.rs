//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

use crate::resilience::backoff::RetryPolicy;

/// Root configuration for the knowledge-base gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Knowledge-base upstream settings.
    pub upstream: UpstreamConfig,

    /// Response cache lifetimes.
    pub cache: CacheConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Retry policies per endpoint class.
    pub retries: RetriesConfig,

    /// Inbound HTTP behaviour.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Knowledge-base upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Feature flag. When false every KB endpoint answers `disabled`.
    pub enabled: bool,

    /// Base URL of the KB service (e.g., "https://kb.internal/api").
    pub base_url: Option<String>,

    /// Optional bearer token sent on every upstream call.
    pub api_key: Option<String>,

    /// Path probed to wake a cold backend.
    pub liveness_path: String,

    /// Timeout applied to each individual upstream attempt, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: None,
            api_key: None,
            liveness_path: "/health".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl UpstreamConfig {
    /// The base URL when the upstream is both enabled and configured.
    pub fn active_base_url(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Cache lifetimes for the single-slot endpoint caches.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL of the `/api/kb/info` slot in seconds.
    pub info_ttl_secs: u64,

    /// TTL of the `/api/kb/list` slot in seconds.
    pub list_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            info_ttl_secs: 30,
            list_ttl_secs: 300,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests per client within one window.
    pub max_requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,

    /// How often expired client entries are purged (0 disables the sweeper).
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 200,
            window_secs: 60,
            sweep_interval_secs: 300,
        }
    }
}

/// Retry configuration for one endpoint class.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds.
    pub initial_delay_ms: u64,

    /// Upper bound on any single delay in milliseconds.
    pub max_delay_ms: u64,

    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 1000,
            max_delay_ms: 5000,
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Defaults for the content class: more retries and a longer cap.
    pub fn content() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
            jitter: false,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            jitter: self.jitter,
        }
    }
}

/// Retry policies per endpoint class.
///
/// Each class table falls back to that class's own defaults field by field,
/// so a partial `[retries.content]` keeps the content values it omits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetriesConfig {
    /// Lightweight status endpoints (`/api/kb/info`).
    #[serde(deserialize_with = "status_retry")]
    pub status: RetryConfig,

    /// Content endpoints (`/api/kb/list`, `/api/kb/doc/...`).
    #[serde(deserialize_with = "content_retry")]
    pub content: RetryConfig,
}

impl Default for RetriesConfig {
    fn default() -> Self {
        Self {
            status: RetryConfig::default(),
            content: RetryConfig::content(),
        }
    }
}

/// A retry table as written, before class defaults are filled in.
#[derive(Deserialize)]
struct RetryTable {
    max_retries: Option<u32>,
    initial_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    jitter: Option<bool>,
}

impl RetryTable {
    fn or(self, defaults: RetryConfig) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            initial_delay_ms: self.initial_delay_ms.unwrap_or(defaults.initial_delay_ms),
            max_delay_ms: self.max_delay_ms.unwrap_or(defaults.max_delay_ms),
            jitter: self.jitter.unwrap_or(defaults.jitter),
        }
    }
}

fn status_retry<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RetryConfig, D::Error> {
    RetryTable::deserialize(deserializer).map(|table| table.or(RetryConfig::default()))
}

fn content_retry<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RetryConfig, D::Error> {
    RetryTable::deserialize(deserializer).map(|table| table.or(RetryConfig::content()))
}

/// Inbound HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request deadline in seconds, covering every retry.
    pub request_timeout_secs: u64,

    /// `Cache-Control` value attached to content responses.
    pub cache_control: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 60,
            cache_control: "public, max-age=300, s-maxage=300".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
