//! Knowledge-base gateway.
//!
//! Fronts an external knowledge-base service for the web frontend.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────────┐
//!                     │                      KB GATEWAY                        │
//!                     │                                                        │
//!   Client Request    │  ┌─────────┐   ┌───────────┐   ┌──────────────┐        │
//!   ──────────────────┼─▶│  http   │──▶│ security  │──▶│    cache     │        │
//!                     │  │ server  │   │rate limit │   │ single slot  │        │
//!                     │  └─────────┘   └───────────┘   └──────┬───────┘        │
//!                     │                                       │ miss           │
//!                     │                                       ▼                │
//!                     │                               ┌──────────────┐         │
//!                     │                               │  resilience  │         │
//!                     │                               │   backoff    │──┐      │
//!                     │                               └──────┬───────┘  │warm  │
//!                     │                                      │          │up    │
//!                     │                                      ▼          ▼      │
//!   Client Response   │  ┌──────────┐                 ┌──────────────────┐     │
//!   ◀─────────────────┼──│  proxy   │◀────────────────│ upstream client  │◀────┼── KB
//!                     │  │ response │                 │    (reqwest)     │     │   Service
//!                     │  └──────────┘                 └──────────────────┘     │
//!                     └───────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use kb_gateway::config::load_config_with;
use kb_gateway::lifecycle::startup;
use kb_gateway::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "kb-gateway")]
#[command(about = "Resilient proxy in front of the knowledge-base service", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "KB_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config_with(args.config.as_deref(), |config| {
        if let Some(bind) = args.bind {
            config.listener.bind_address = bind;
        }
    })?;

    logging::init(&config.observability);

    tracing::info!("kb-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_enabled = config.upstream.enabled,
        rate_limit = config.rate_limit.max_requests,
        rate_window_secs = config.rate_limit.window_secs,
        request_timeout_secs = config.http.request_timeout_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
