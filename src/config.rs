//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// The entry TTL is deliberately absent: it is fixed at one hour.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Directory for the durable stores, None = in-memory stores
    pub data_dir: Option<PathBuf>,
    /// Whether the structured store should be attempted at all
    pub structured_store: bool,
    /// Upper bound on the structured store open handshake, in milliseconds
    pub open_timeout_ms: u64,
    /// Expiry sweep interval in seconds, 0 = no sweep
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DATA_DIR` - Directory for durable stores (default: unset, in-memory)
    /// - `STRUCTURED_STORE` - `false`, `0` or `off` disables it (default: enabled)
    /// - `OPEN_TIMEOUT_MS` - Structured store open timeout (default: 5000)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 0)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            data_dir: env::var("DATA_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            structured_store: env::var("STRUCTURED_STORE")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "off"))
                .unwrap_or(defaults.structured_store),
            open_timeout_ms: parse_var("OPEN_TIMEOUT_MS").unwrap_or(defaults.open_timeout_ms),
            sweep_interval: parse_var("SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
        }
    }

    /// Open timeout as a Duration.
    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            data_dir: None,
            structured_store: true,
            open_timeout_ms: 5000,
            sweep_interval: 0,
        }
    }
}
