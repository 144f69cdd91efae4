//! Shared configuration for the Salesforce MCP server crates.

// Configuration types shared across all sfmcp crates
pub mod config;

pub use config::{
    AuthConfig, ConfigError, Credentials, LoggingConfig, McpConfig, QueryConfig,
    SalesforceConfig, SfmcpConfig, Transport,
};
