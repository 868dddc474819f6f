//! Startup orchestration.
//!
//! Order: metrics exporter, proxy state (upstream client), listener, then
//! signal handling and the server loop. Any startup error is fatal.

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize upstream: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start every subsystem and serve until a stop signal arrives.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
