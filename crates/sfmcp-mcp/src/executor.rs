//! Tool execution engine.
//!
//! This module handles the actual execution of MCP tools:
//! - Checking arguments against the tool's JSON schema
//! - Building SOQL/SOSL through the validated builders
//! - Dry runs that return the query text
//! - Calling Salesforce and shaping the response

use crate::error::McpError;
use crate::format;
use crate::handlers;
use crate::protocol::{CallToolOptions, DryRunResult, ToolContent, ToolDefinition};
use crate::tool_definitions::ToolKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sfmcp_client::SalesforceClient;
use sfmcp_core::QueryConfig;
use sfmcp_soql::QueryBuilder;
use std::sync::Arc;

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the execution was successful.
    pub success: bool,
    /// The result content.
    pub content: Vec<ToolContent>,
    /// Whether this was a dry-run.
    #[serde(rename = "isDryRun")]
    pub is_dry_run: bool,
    /// Error message if failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Create a successful result carrying pretty-printed JSON.
    pub fn success_json(value: &Value) -> Self {
        Self {
            success: true,
            content: vec![ToolContent::text(pretty(value))],
            is_dry_run: false,
            error: None,
        }
    }

    /// Create a successful dry-run result.
    pub fn dry_run(result: DryRunResult) -> Self {
        let value = serde_json::to_value(&result).unwrap_or_default();
        Self {
            is_dry_run: true,
            ..Self::success_json(&value)
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self {
            success: false,
            content: vec![ToolContent::text(msg.clone())],
            is_dry_run: false,
            error: Some(msg),
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Runs tool calls against one Salesforce org.
pub struct ToolExecutor {
    client: Arc<dyn SalesforceClient>,
    builder: QueryBuilder,
    query_config: QueryConfig,
    read_only: bool,
}

impl ToolExecutor {
    pub fn new(client: Arc<dyn SalesforceClient>) -> Self {
        Self {
            client,
            builder: QueryBuilder::new(),
            query_config: QueryConfig::default(),
            read_only: false,
        }
    }

    /// Set the query limits and ORDER BY allow-lists.
    pub fn with_query_config(mut self, config: QueryConfig) -> Self {
        self.query_config = config;
        self
    }

    /// Refuse write tools.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Execute a tool call. Failures come back as error results, never as
    /// JSON-RPC errors.
    pub async fn execute(
        &self,
        tool: &ToolDefinition,
        arguments: Value,
        options: &CallToolOptions,
    ) -> ExecutionResult {
        match self.run(tool, arguments, options).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = %tool.name, error = %e, "Tool call failed");
                ExecutionResult::error(e.to_string())
            }
        }
    }

    async fn run(
        &self,
        tool: &ToolDefinition,
        arguments: Value,
        options: &CallToolOptions,
    ) -> Result<ExecutionResult, McpError> {
        let kind: ToolKind = tool.name.parse().map_err(|_| McpError::ToolNotFound {
            name: tool.name.clone(),
        })?;

        if kind.is_write() && self.read_only {
            return Err(McpError::ToolDisabled {
                tool: tool.name.clone(),
                reason: "the server is running in read-only mode".to_string(),
            });
        }
        if options.dry_run && !kind.supports_dry_run() {
            return Err(McpError::invalid_arguments(
                &tool.name,
                "dryRun is only supported by query and search tools",
            ));
        }

        validate_arguments(tool, &arguments)?;
        tracing::debug!(tool = %tool.name, dry_run = options.dry_run, "Executing tool");

        let client = self.client.as_ref();
        let value = match kind {
            ToolKind::SearchObjects => {
                handlers::search_objects(client, parse_args(tool, arguments)?).await?
            }
            ToolKind::DescribeObject => {
                handlers::describe_object(client, parse_args(tool, arguments)?).await?
            }
            ToolKind::QueryRecords | ToolKind::AggregateQuery | ToolKind::SearchAll => {
                let built = assemble(&self.builder, &self.query_config, tool, kind, arguments)?;
                if options.dry_run {
                    return Ok(ExecutionResult::dry_run(built));
                }
                if kind == ToolKind::SearchAll {
                    format::search_result(client.search(&built.query).await?.search_records)
                } else {
                    format::query_result(client.query(&built.query).await?)
                }
            }
            ToolKind::DmlRecords => {
                handlers::dml_records(client, parse_args(tool, arguments)?).await?
            }
        };

        Ok(ExecutionResult::success_json(&value))
    }
}

/// Build the SOQL or SOSL text a query tool would run, without calling
/// Salesforce. Arguments are checked against the tool's schema first.
pub fn build_query_text(
    builder: &QueryBuilder,
    config: &QueryConfig,
    kind: ToolKind,
    arguments: Value,
) -> Result<DryRunResult, McpError> {
    let tool = kind.definition();
    validate_arguments(&tool, &arguments)?;
    assemble(builder, config, &tool, kind, arguments)
}

fn assemble(
    builder: &QueryBuilder,
    config: &QueryConfig,
    tool: &ToolDefinition,
    kind: ToolKind,
    arguments: Value,
) -> Result<DryRunResult, McpError> {
    let (language, query) = match kind {
        ToolKind::QueryRecords => (
            "soql",
            handlers::build_query(builder, config, parse_args(tool, arguments)?)?,
        ),
        ToolKind::AggregateQuery => (
            "soql",
            handlers::build_aggregate(builder, config, parse_args(tool, arguments)?)?,
        ),
        ToolKind::SearchAll => ("sosl", handlers::build_search(builder, parse_args(tool, arguments)?)?),
        other => {
            return Err(McpError::invalid_arguments(
                other.name(),
                "only query and search tools produce query text",
            ));
        }
    };

    Ok(DryRunResult {
        dry_run: true,
        language: language.to_string(),
        query,
    })
}

/// Check arguments against the tool's input schema, reporting every violation.
fn validate_arguments(tool: &ToolDefinition, arguments: &Value) -> Result<(), McpError> {
    let validator = jsonschema::validator_for(&tool.input_schema).map_err(|e| {
        McpError::Internal(anyhow::anyhow!("schema of tool {} does not compile: {}", tool.name, e))
    })?;

    let problems: Vec<String> = validator
        .iter_errors(arguments)
        .map(|error| {
            let path = error.instance_path().to_string();
            let location = if path.is_empty() { "(root)".to_string() } else { path };
            format!("{}: {}", location, error)
        })
        .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(McpError::invalid_arguments(&tool.name, problems.join("; ")))
    }
}

fn parse_args<T: DeserializeOwned>(tool: &ToolDefinition, arguments: Value) -> Result<T, McpError> {
    serde_json::from_value(arguments).map_err(|e| McpError::invalid_arguments(&tool.name, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_violations_are_listed() {
        let tool = ToolKind::QueryRecords.definition();
        let err = validate_arguments(&tool, &json!({"objectName": "Account", "fields": [], "bogus": 1}))
            .unwrap_err()
            .to_string();
        assert!(err.contains("salesforce_query_records"));
        assert!(err.contains("/fields"));
        assert!(err.contains("bogus"));
    }

    #[test]
    fn test_valid_arguments_pass() {
        let tool = ToolKind::AggregateQuery.definition();
        validate_arguments(
            &tool,
            &json!({
                "objectName": "Opportunity",
                "selectFields": ["CALENDAR_YEAR(CloseDate)", "SUM(Amount)"],
                "groupByFields": [{"field": "CloseDate", "dateGranularity": "CALENDAR_YEAR"}]
            }),
        )
        .unwrap();
    }

    #[test]
    fn test_build_query_text_without_a_client() {
        let built = build_query_text(
            &QueryBuilder::new(),
            &QueryConfig::default(),
            ToolKind::SearchAll,
            json!({"searchTerm": "Acme", "searchIn": "NAME_FIELDS"}),
        )
        .unwrap();
        assert_eq!(built.language, "sosl");
        assert_eq!(built.query, "FIND {Acme} IN NAME FIELDS");

        let err = build_query_text(
            &QueryBuilder::new(),
            &QueryConfig::default(),
            ToolKind::DescribeObject,
            json!({"objectName": "Account"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("query text"));
    }

    #[test]
    fn test_error_result_shape() {
        let result = ExecutionResult::error("Invalid field name: Na me");
        assert!(!result.success);
        assert_eq!(result.content[0].as_text(), "Invalid field name: Na me");
    }
}
