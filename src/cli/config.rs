//! Service configuration
//!
//! Loaded from a JSON file:
//!
//! ```json
//! {"database_url": "postgres://tableforge@localhost/app",
//!  "max_connections": 5,
//!  "http": {"port": 8088}}
//! ```
//!
//! `DATABASE_URL` in the environment replaces `database_url`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;

use super::errors::{CliError, CliResult};

/// Environment variable overriding `database_url`
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// PostgreSQL connection string
    #[serde(default)]
    pub database_url: String,

    /// Pool size (optional, default 5)
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection (optional, default 30)
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// Admin API settings
    #[serde(default)]
    pub http: HttpServerConfig,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

impl ServiceConfig {
    /// Load configuration from file, applying the environment override
    pub fn load(path: &Path) -> CliResult<Self> {
        Self::load_with_env(path, std::env::var(DATABASE_URL_ENV).ok())
    }

    /// Load configuration from file with an explicit `DATABASE_URL` value
    pub fn load_with_env(path: &Path, database_url: Option<String>) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: ServiceConfig = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        if let Some(url) = database_url.filter(|url| !url.trim().is_empty()) {
            config.database_url = url;
        }

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(CliError::config_error(format!(
                "database_url is required (or set {})",
                DATABASE_URL_ENV
            )));
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(CliError::config_error(
                "database_url must use the postgres:// or postgresql:// scheme",
            ));
        }

        if self.max_connections == 0 {
            return Err(CliError::config_error("max_connections must be > 0"));
        }

        Ok(())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}
