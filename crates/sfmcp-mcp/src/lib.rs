//! # sfmcp-mcp
//!
//! MCP (Model Context Protocol) server exposing a Salesforce org as tools
//! for AI agents.
//!
//! ## Architecture
//!
//! ```text
//! AI Agent
//!       │
//!       │ MCP protocol (tools/list, tools/call)
//!       ▼
//! ┌─────────────────────┐
//! │  sfmcp MCP server   │
//! │  1. Schema-check    │  ← jsonschema
//! │     arguments       │
//! │  2. Build SOQL/SOSL │  ← sfmcp-soql
//! │  3. Dry-run or      │
//! │     execute         │  ← sfmcp-client
//! │  4. Return JSON     │
//! └──────────┬──────────┘
//!            │
//!            ▼
//!     Salesforce REST API
//! ```
//!
//! Query text is only ever produced by the validated builders; failures
//! surface as tool results with `isError: true` and a message naming the
//! offending field or value.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sfmcp_client::RestClient;
//! use sfmcp_core::SfmcpConfig;
//! use sfmcp_mcp::{McpServer, ToolExecutor};
//! use std::sync::Arc;
//!
//! let config = SfmcpConfig::from_file("sfmcp.yaml")?;
//! let client = RestClient::connect(&config.salesforce).await?;
//! let executor = ToolExecutor::new(Arc::new(client)).with_query_config(config.query);
//! McpServer::new(config.mcp, executor).run().await?;
//! ```

pub mod error;
pub mod executor;
pub mod format;
pub mod handlers;
pub mod http_transport;
pub mod protocol;
pub mod server;
pub mod tool_definitions;
pub mod tools;

pub use error::McpError;
pub use executor::{build_query_text, ExecutionResult, ToolExecutor};
pub use protocol::{
    CallToolOptions, CallToolParams, CallToolResponse, DryRunResult, JsonRpcRequest,
    JsonRpcResponse, ToolAnnotations, ToolContent, ToolDefinition,
};
pub use server::McpServer;
pub use tool_definitions::{all_tools, ToolKind};
pub use tools::ToolRegistry;
