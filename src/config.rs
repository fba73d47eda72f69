//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
    /// Data directory for snapshots (None = in-memory only)
    pub data_path: Option<String>,
    /// Seed a demo family when the store starts empty
    pub seed_demo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            data_path: Some("./kinship_data".to_string()),
            seed_demo: true,
        }
    }
}

impl ServerConfig {
    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Load from the file named by `KINSHIP_CONFIG`, or fall back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var("KINSHIP_CONFIG") {
            Ok(path) => Self::from_file(path),
            Err(_) => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.seed_demo);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: ServerConfig = serde_yaml::from_str("port: 9000\ndata_path: null\n").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_path, None);
        assert_eq!(config.address, "127.0.0.1");
    }
}
