//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream call from a proxy handler:
//!     → backoff.rs (run attempt, on failure notify observer, sleep, retry)
//!     → observer fires the warm-up probe after the first failure
//!     → final failure surfaces unchanged to the handler
//! ```
//!
//! # Design Decisions
//! - Per-attempt timeouts live in the upstream client, not here
//! - Deterministic delays by default; jitter is opt-in
//! - Not-found is not a failure: callers map it to `Ok(None)` before retrying

pub mod backoff;

pub use backoff::{retry, retry_with_backoff, RetryPolicy};
