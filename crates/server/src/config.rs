//! Configuration loading for the TWAP service
//!
//! One JSON file covers the listener, session behaviour and the paper venue.
//! Every field is optional.

use serde::{Deserialize, Serialize};
use std::path::Path;
use twap_engine::SessionConfig;
use twap_gateway::PaperConfig;

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name, logged at startup
    #[serde(default = "default_service_name")]
    pub name: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    /// Paper venue used when no live venue is wired in
    #[serde(default)]
    pub paper: PaperConfig,
}

fn default_service_name() -> String {
    "TWAP Execution Service".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            paper: PaperConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// `host:port` to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-connection queue of outbound progress events
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_outbound_capacity() -> usize {
    256
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            outbound_capacity: default_outbound_capacity(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, error: String },
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, error } => {
                write!(f, "Failed to read config file '{}': {}", path, error)
            }
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_minimal_config() {
        let config = ServiceConfig::from_json("{}").unwrap();

        assert_eq!(config.name, "TWAP Execution Service");
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.server.outbound_capacity, 256);
        assert!(!config.session.report_slice_start);
        assert_eq!(config.session.max_slices, 1000);
        assert_eq!(config.paper.balances["USDT"], dec!(10000));
    }

    #[test]
    fn test_parse_partial_sections() {
        let json = r#"{
            "name": "desk-1",
            "server": { "port": 9100 },
            "session": { "report_slice_start": true, "max_slices": 50 },
            "paper": {
                "balances": { "USDC": 2500 },
                "prices": { "SOL-USDC": "142.37" },
                "quantity_scale": 3
            }
        }"#;

        let config = ServiceConfig::from_json(json).unwrap();

        assert_eq!(config.name, "desk-1");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9100);
        assert!(config.session.report_slice_start);
        assert_eq!(config.session.max_slices, 50);
        assert_eq!(config.session.size_scale, 8);
        assert_eq!(config.paper.prices["SOL-USDC"], dec!(142.37));
        assert_eq!(config.paper.price_scale, 2);
        assert_eq!(config.paper.quantity_scale, 3);
    }

    #[test]
    fn test_config_errors() {
        let err = ServiceConfig::from_json(r#"{"server": {"port": "eighty"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("Failed to parse config:"));

        let err = ServiceConfig::from_file("/nonexistent/twap.json").unwrap_err();
        assert!(
            matches!(err, ConfigError::Io { ref path, .. } if path == "/nonexistent/twap.json")
        );
    }
}
