//! Upstream health probing.
//!
//! # Data Flow
//! ```text
//! Upstream attempt fails (attempt 1)
//!     → backoff observer (warmup.rs)
//!     → GET liveness path with the same auth headers
//!     → outcome logged and discarded
//!     → backoff delay, then the retried call
//! ```
//!
//! # Design Decisions
//! - Probe is awaited, so its latency adds to the backoff delay
//! - Probe failure never changes the retry result

pub mod warmup;

pub use warmup::{retry_observer, warm_up};
