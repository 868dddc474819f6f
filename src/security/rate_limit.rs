//! Fixed-window rate limiting keyed by client address.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, Instant};

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Request counter for one client within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_reset_at: Instant,
}

impl RateLimitEntry {
    fn open(now: Instant, window: Duration) -> Self {
        Self {
            count: 1,
            window_reset_at: now + window,
        }
    }
}

/// Fixed-window counter.
///
/// Admits up to `limit` requests per key per window. Bursts of up to
/// `2 * limit` are possible across a window boundary.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,
    window: Duration,
    enabled: bool,
}

impl FixedWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
            enabled: true,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            ..Self::new(config.max_requests, Duration::from_secs(config.window_secs))
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count a request from `key` and report whether it may proceed.
    pub fn allow(&self, key: &str) -> bool {
        if !self.enabled {
            return true;
        }

        let now = Instant::now();
        match self.entries.entry(key.to_owned()) {
            Entry::Vacant(vacant) => {
                vacant.insert(RateLimitEntry::open(now, self.window));
                true
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if now > entry.window_reset_at {
                    *entry = RateLimitEntry::open(now, self.window);
                    true
                } else if entry.count < self.limit {
                    entry.count += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Current entry for `key`, if any.
    pub fn entry(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|entry| *entry)
    }

    /// Number of tracked client keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries whose window has ended. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.window_reset_at);
        before.saturating_sub(self.entries.len())
    }
}

/// Periodically purge expired entries until shutdown.
pub async fn run_sweeper(
    limiter: Arc<FixedWindowLimiter>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    if interval.is_zero() {
        tracing::info!("Rate limit sweeper disabled");
        return;
    }

    tracing::info!(interval = ?interval, "Rate limit sweeper starting");
    let mut ticker = time::interval(interval);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = limiter.purge_expired();
                metrics::record_rate_limit_keys(limiter.len());
                if removed > 0 {
                    tracing::debug!(removed, remaining = limiter.len(), "Purged expired rate limit entries");
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Rate limit sweeper received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
