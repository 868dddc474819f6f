//! Knowledge-base upstream integration.
//!
//! # Data Flow
//! ```text
//! UpstreamConfig (base URL, api key, timeout)
//!     → client.rs (reqwest client with bearer header)
//!     → GET /info, /kb/list, /kb/get/{id}, liveness path
//!     → types.rs (status classification: not-found vs. transient)
//! ```
//!
//! # Constraints
//! - The API key is marked sensitive and never logged
//! - Every call has a per-attempt timeout
//! - Disabled or unconfigured upstream means no client at all

pub mod client;
pub mod types;

pub use client::KbClient;
pub use types::{ErrorClass, UpstreamError, UpstreamResult};
