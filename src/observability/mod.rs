//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout log aggregation
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Request ID (tower-http) is attached to every access span
//! - Metrics are cheap; the exporter is optional

pub mod logging;
pub mod metrics;
