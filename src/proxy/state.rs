//! Shared state owned by the proxy handlers.

use axum::http::HeaderValue;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::config::validation::document_deadline;
use crate::config::GatewayConfig;
use crate::observability::metrics;
use crate::proxy::error::ApiError;
use crate::resilience::RetryPolicy;
use crate::security::{ClientKey, FixedWindowLimiter};
use crate::upstream::{KbClient, UpstreamResult};

const DEFAULT_CACHE_CONTROL: &str = "public, max-age=300, s-maxage=300";

/// Everything a KB request needs, created once at startup.
#[derive(Debug)]
pub struct ProxyState {
    upstream: Option<KbClient>,
    pub limiter: Arc<FixedWindowLimiter>,
    pub info_cache: ResponseCache<Value>,
    pub list_cache: ResponseCache<Value>,
    pub status_policy: RetryPolicy,
    pub content_policy: RetryPolicy,
    /// Cut-off for a whole document candidate lookup.
    pub document_deadline: Duration,
    pub cache_control: HeaderValue,
}

impl ProxyState {
    pub fn from_config(config: &GatewayConfig) -> UpstreamResult<Self> {
        let upstream = KbClient::from_config(&config.upstream)?;
        if upstream.is_none() {
            tracing::warn!("Knowledge-base upstream disabled or unconfigured; KB endpoints will answer 'disabled'");
        }

        let cache_control = HeaderValue::from_str(&config.http.cache_control).unwrap_or_else(|_| {
            tracing::warn!(value = %config.http.cache_control, "Invalid Cache-Control value, using default");
            HeaderValue::from_static(DEFAULT_CACHE_CONTROL)
        });

        Ok(Self {
            upstream,
            limiter: Arc::new(FixedWindowLimiter::from_config(&config.rate_limit)),
            info_cache: ResponseCache::new(Duration::from_secs(config.cache.info_ttl_secs)),
            list_cache: ResponseCache::new(Duration::from_secs(config.cache.list_ttl_secs)),
            status_policy: config.retries.status.policy(),
            content_policy: config.retries.content.policy(),
            document_deadline: document_deadline(config),
            cache_control,
        })
    }

    /// The upstream client, or `None` when the integration is disabled.
    pub fn upstream(&self) -> Option<&KbClient> {
        self.upstream.as_ref()
    }

    /// Rate limit gate for `client`.
    pub fn admit(&self, endpoint: &'static str, client: &ClientKey, request_id: &str) -> Result<(), ApiError> {
        if self.limiter.allow(client.as_str()) {
            return Ok(());
        }

        tracing::warn!(
            request_id = %request_id,
            endpoint,
            client = %client,
            limit = self.limiter.limit(),
            "Rate limit exceeded"
        );
        metrics::record_rate_limited(endpoint);
        Err(ApiError::RateLimited)
    }
}
