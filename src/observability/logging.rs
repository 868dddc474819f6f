//! Structured logging.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to this
//! crate and `tower_http` access spans are logged at info.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Default filter directive for a configured log level.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    format!("kb_gateway={},tower_http=info", config.log_level)
}

/// Install the global tracing subscriber.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    // try_init: tests and embedding binaries may already have a subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
