//! Single-slot, time-bounded response cache.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// The stored payload and the instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub stored_at: Instant,
}

impl<T> CacheEntry<T> {
    /// Fresh while strictly less than `ttl` has elapsed since storage.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Memoizes exactly one upstream result for `ttl`.
#[derive(Debug)]
pub struct ResponseCache<T> {
    slot: Mutex<Option<CacheEntry<T>>>,
    ttl: Duration,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The stored payload if it is still fresh.
    pub fn get(&self) -> Option<T> {
        let now = Instant::now();
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|entry| entry.is_fresh(self.ttl, now))
            .map(|entry| entry.data.clone())
    }

    /// Overwrite the slot, stamping it with the current instant.
    pub fn set(&self, data: T) {
        let entry = CacheEntry {
            data,
            stored_at: Instant::now(),
        };
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(entry);
    }
}
