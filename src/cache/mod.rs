//! Response caching.
//!
//! # Design Decisions
//! - One slot per cached endpoint; the slot is owned by the proxy state
//! - Entries go stale and are overwritten, never removed
//! - No stampede protection: concurrent misses may both call upstream,
//!   which is acceptable because every cached upstream call is idempotent

pub mod response;

pub use response::{CacheEntry, ResponseCache};
