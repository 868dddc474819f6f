//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming KB request:
//!     → headers.rs (derive client key from X-Forwarded-For / X-Real-IP)
//!     → rate_limit.rs (fixed-window check for that key)
//!     → proxy handler
//! ```
//!
//! # Design Decisions
//! - Limits are per process; instances behind a load balancer do not share counters
//! - Rejection happens before any cache lookup or upstream call

pub mod headers;
pub mod rate_limit;

pub use headers::ClientKey;
pub use rate_limit::FixedWindowLimiter;
