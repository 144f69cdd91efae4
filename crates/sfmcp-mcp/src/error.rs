//! Error types for the MCP crate.

use sfmcp_client::ClientError;
use sfmcp_soql::SoqlError;
use thiserror::Error;

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Tool not found.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// Invalid arguments for tool.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// The tool is disabled by configuration.
    #[error("tool {tool} is disabled: {reason}")]
    ToolDisabled { tool: String, reason: String },

    /// Query text could not be built from the arguments.
    #[error(transparent)]
    Query(#[from] SoqlError),

    /// Salesforce rejected or failed the call.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Transport error.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl McpError {
    pub(crate) fn invalid_arguments(tool: &str, reason: impl Into<String>) -> Self {
        McpError::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }
}
