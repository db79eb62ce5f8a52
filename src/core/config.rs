//! Configuration management for the MCP server.
//!
//! Configuration is read once at startup from environment variables (and an
//! optional `.env` file) and is immutable afterwards. It is shared with the
//! tool handlers through an `Arc<Config>`.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable holding the datapoint backend URL.
pub const DATAPOINT_URL_VAR: &str = "DATAPOINT_TOOL_URL";

/// Environment variable holding the retrieval (articles) backend URL.
pub const RETRIEVAL_URL_VAR: &str = "RETRIEVAL_TOOL_URL";

/// Environment variable overriding the outbound request timeout, in seconds.
pub const REQUEST_TIMEOUT_VAR: &str = "MCP_REQUEST_TIMEOUT_SECS";

/// Default outbound request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Downstream Morningstar backends.
    pub backends: BackendConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Endpoints and limits for the outbound backend calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// URL of the datapoint lookup backend.
    pub datapoint_url: String,

    /// URL of the retrieval QA backend used for articles.
    pub retrieval_url: String,

    /// Upper bound on a single backend round-trip.
    pub request_timeout: Duration,
}

impl BackendConfig {
    /// Create a backend configuration with the default timeout.
    pub fn new(datapoint_url: impl Into<String>, retrieval_url: impl Into<String>) -> Self {
        Self {
            datapoint_url: datapoint_url.into(),
            retrieval_url: retrieval_url.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Morningstar MCP Server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Create a configuration for the given backends, defaults elsewhere.
    pub fn new(backends: BackendConfig) -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            transport: TransportConfig::default(),
            backends,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Both backend URLs are required; a missing one is a fatal
    /// configuration error and the server must not start.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.transport = TransportConfig::from_env();
        Ok(config)
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// The transport is left at its default; `from_env` fills it in.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let datapoint_url = required(&lookup, DATAPOINT_URL_VAR)?;
        let retrieval_url = required(&lookup, RETRIEVAL_URL_VAR)?;

        let mut config = Self::new(BackendConfig::new(datapoint_url, retrieval_url));

        if let Some(name) = lookup("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Some(level) = lookup("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(raw) = lookup(REQUEST_TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    config.backends.request_timeout = Duration::from_secs(secs);
                    info!("Backend request timeout set to {}s", secs);
                }
                _ => warn!(
                    "Ignoring invalid {}={:?}, using {}s",
                    REQUEST_TIMEOUT_VAR, raw, DEFAULT_REQUEST_TIMEOUT_SECS
                ),
            }
        }

        Ok(config)
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(Error::config(format!(
            "{} must be set to the backend URL",
            key
        ))),
    }
}
