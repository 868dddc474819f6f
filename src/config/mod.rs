//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared with the HTTP server and proxy state at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Environment variables override file values (secrets stay out of files)

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_with, ConfigError};
pub use schema::{
    CacheConfig, GatewayConfig, HttpConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig,
    RetriesConfig, RetryConfig, UpstreamConfig,
};
pub use validation::ValidationError;
