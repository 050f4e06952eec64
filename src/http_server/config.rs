//! HTTP Server Configuration
//!
//! The `http_server` section of the service config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Address to bind, e.g. "localhost:8082" (host names are resolved)
    #[serde(default)]
    pub address: String,

    /// Per-request deadline in seconds (default: 10)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8082".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl HttpServerConfig {
    /// Create a new config bound to the given address
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
