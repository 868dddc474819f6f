//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_ENABLED: &str = "KB_ENABLED";
pub const ENV_BASE_URL: &str = "KB_BASE_URL";
pub const ENV_API_KEY: &str = "KB_API_KEY";
pub const ENV_BIND_ADDRESS: &str = "KB_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_config_with(path, |_| {})
}

/// Like [`load_config`], with `overrides` (command-line flags) applied
/// after the environment and before validation.
pub fn load_config_with<F>(path: Option<&Path>, overrides: F) -> Result<GatewayConfig, ConfigError>
where
    F: FnOnce(&mut GatewayConfig),
{
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    apply_overrides(&mut config, |name| env::var(name).ok());
    overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay values from `lookup` (normally the process environment).
pub fn apply_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_ENABLED) {
        match parse_bool(&value) {
            Some(enabled) => config.upstream.enabled = enabled,
            None => tracing::warn!(variable = ENV_ENABLED, value = %value, "Ignoring non-boolean override"),
        }
    }
    if let Some(url) = lookup(ENV_BASE_URL) {
        config.upstream.base_url = Some(url);
    }
    if let Some(key) = lookup(ENV_API_KEY) {
        config.upstream.api_key = Some(key);
    }
    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
