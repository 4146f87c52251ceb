//! Configuration loader for the `aqi-monitor` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Nothing else in the crate reads `env::var`
//! directly; everything receives a [`Config`] snapshot instead.
//!
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer variable with a default value.
macro_rules! parse_var_or {
    ($lookup:expr, $var_name:expr, $ty:ty, $default:expr) => {
        $lookup($var_name)
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string variable.
macro_rules! require_var {
    ($lookup:expr, $var_name:expr) => {
        $lookup($var_name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Default path segment under which the three store resources live.
pub const DEFAULT_STORE_ROOT: &str = "air_quality";

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Document store base URL, without trailing slash.
    pub store_url: String,

    /// Path segment holding `sensorData`, `predictions` and `metadata`.
    pub store_root: String,

    /// Seconds between two automatic refresh cycles.
    pub poll_interval_secs: u64,

    /// Port the JSON API listens on.
    pub http_port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `STORE_BASE_URL` – document store base URL
///
/// Optional:
/// - `STORE_ROOT` – resource root (default: `air_quality`)
/// - `POLL_INTERVAL_SECS` – refresh cadence (default: 60)
/// - `HTTP_PORT` – API port (default: 8080)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    load_with(|key| env::var(key).ok())
}

/// Same as [`load_from_env`], reading values through `lookup`.
pub fn load_with<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // ---
    let store_url = require_var!(lookup, "STORE_BASE_URL")
        .trim()
        .trim_end_matches('/')
        .to_string();
    let store_root = lookup("STORE_ROOT")
        .map(|v| v.trim().trim_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_STORE_ROOT.to_string());
    let poll_interval_secs = parse_var_or!(lookup, "POLL_INTERVAL_SECS", u64, 60);
    let http_port = parse_var_or!(lookup, "HTTP_PORT", u16, 8080);

    if poll_interval_secs == 0 {
        return Err(anyhow!("Invalid POLL_INTERVAL_SECS: must be greater than 0"));
    }

    Ok(Config {
        store_url,
        store_root,
        poll_interval_secs,
        http_port,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  STORE_BASE_URL     : {}", self.store_url);
        tracing::info!("  STORE_ROOT         : {}", self.store_root);
        tracing::info!("  POLL_INTERVAL_SECS : {}", self.poll_interval_secs);
        tracing::info!("  HTTP_PORT          : {}", self.http_port);
    }
}
