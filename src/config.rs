//! Service configuration
//!
//! Loaded from a YAML file:
//!
//! ```yaml
//! env: "dev"
//! db:
//!   driver: "sqlite"
//!   storage_path: "storage/storage.db"
//! http_server:
//!   address: "localhost:8082"
//! ```
//!
//! `env` defaults to "production" and the `ENV` environment variable
//! overrides it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::{CliError, CliResult};
use crate::http_server::HttpServerConfig;
use crate::storage::DbConfig;

/// Environment variable overriding `env`
pub const ENV_VAR: &str = "ENV";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Deployment environment; selects the log format
    #[serde(default = "default_env")]
    pub env: String,

    #[serde(default)]
    pub db: DbConfig,

    pub http_server: HttpServerConfig,
}

fn default_env() -> String {
    "production".to_string()
}

impl Config {
    /// Load configuration from file, applying environment overrides
    pub fn load(path: &Path) -> CliResult<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load configuration, resolving environment variables through `lookup`
    pub fn load_with_env<F>(path: &Path, lookup: F) -> CliResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !path.exists() {
            return Err(CliError::config_error(format!(
                "Config file does not exist {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("cannot read config file {}", e)))?;

        let mut config = Self::parse(&content)?;
        if let Some(env) = lookup(ENV_VAR).filter(|v| !v.is_empty()) {
            config.env = env;
        }

        config.validate()?;

        Ok(config)
    }

    /// Parse YAML without validating
    pub fn parse(content: &str) -> CliResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| CliError::config_error(format!("cannot read config file {}", e)))
    }

    /// Validate required fields
    pub fn validate(&self) -> CliResult<()> {
        self.db
            .validate()
            .map_err(|e| CliError::config_error(e.to_string()))?;

        if self.http_server.address.is_empty() {
            return Err(CliError::config_error("http_server.address is required"));
        }

        if self.http_server.request_timeout_secs == 0 {
            return Err(CliError::config_error(
                "http_server.request_timeout_secs must be > 0",
            ));
        }

        Ok(())
    }
}
