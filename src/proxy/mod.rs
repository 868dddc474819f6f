//! Knowledge-base proxy.
//!
//! # Data Flow
//! ```text
//! GET /api/kb/...
//!     → handlers.rs (disabled check)
//!     → security (client key, fixed-window limit)
//!     → cache (single slot per cached endpoint)
//!     → resilience (backoff executor, warm-up observer)
//!     → upstream client
//!     → lookup.rs (candidate ids for document paths)
//!     → response / error.rs
//! ```
//!
//! # Failure Policy
//! - Status endpoints mask upstream outages as `{"status": "degraded"}` (200)
//! - Content endpoints answer 503 so stale or empty data never looks valid
//! - Missing documents answer 404 only after every candidate id

pub mod error;
pub mod handlers;
pub mod lookup;
pub mod state;

pub use error::ApiError;
pub use state::ProxyState;
