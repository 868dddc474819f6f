//! Knowledge-base gateway library.

pub mod cache;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resilience;
pub mod security;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
