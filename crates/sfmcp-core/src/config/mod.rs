//! Configuration types for the Salesforce MCP server.
//!
//! Configuration is loaded from a single YAML file (`sfmcp.yaml`). Every
//! section is optional; a missing file section falls back to its defaults and
//! secrets are normally supplied through environment variables.
//!
//! ```yaml
//! salesforce:
//!   instance_url_env: SALESFORCE_INSTANCE_URL
//!   api_version: "62.0"
//!   auth:
//!     method: client_credentials
//!     client_id_env: SF_CLIENT_ID
//!     client_secret_env: SF_CLIENT_SECRET
//! mcp:
//!   transport: http
//!   port: 3000
//! query:
//!   default_limit: 200
//!   max_limit: 2000
//! logging:
//!   level: info
//! ```

pub mod mcp;
pub mod query;
pub mod salesforce;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use mcp::{McpConfig, Transport};
pub use query::{QueryConfig, PLATFORM_MAX_LIMIT};
pub use salesforce::{AuthConfig, Credentials, SalesforceConfig};

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SfmcpConfig {
    /// Salesforce org connection.
    #[serde(default)]
    pub salesforce: SalesforceConfig,

    /// MCP server settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Query guardrails.
    #[serde(default)]
    pub query: QueryConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `sfmcp_soql=debug,info`.
    /// `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SfmcpConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.salesforce.validate()?;
        self.query.validate()?;
        Ok(())
    }
}
