//! `sfmcp soql` - build query text offline.
//!
//! Takes the same JSON arguments as the query tools and prints the SOQL or
//! SOSL the server would send, using the configured limits. Nothing is sent
//! to Salesforce.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::Value;
use sfmcp_core::SfmcpConfig;
use sfmcp_mcp::{build_query_text, ToolKind};
use sfmcp_soql::QueryBuilder;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryTool {
    /// salesforce_query_records
    Query,
    /// salesforce_aggregate_query
    Aggregate,
    /// salesforce_search_all
    Search,
}

impl From<QueryTool> for ToolKind {
    fn from(tool: QueryTool) -> Self {
        match tool {
            QueryTool::Query => ToolKind::QueryRecords,
            QueryTool::Aggregate => ToolKind::AggregateQuery,
            QueryTool::Search => ToolKind::SearchAll,
        }
    }
}

/// Arguments for `sfmcp soql`.
#[derive(Debug, Args)]
pub struct SoqlArgs {
    /// Which tool's arguments to build.
    #[arg(value_enum)]
    pub tool: QueryTool,

    /// Tool arguments as inline JSON.
    #[arg(long, conflicts_with = "file")]
    pub args: Option<String>,

    /// File holding the tool arguments as JSON. Reads stdin when neither
    /// --args nor --file is given.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Print the full JSON result instead of the bare query.
    #[arg(long)]
    pub json: bool,
}

fn read_arguments(args: &SoqlArgs) -> Result<Value> {
    let text = match (&args.args, &args.file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read arguments file: {:?}", path))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read arguments from stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("Tool arguments are not valid JSON")
}

/// Build the query for `tool` from `arguments` under the given config.
pub fn render(config: &SfmcpConfig, tool: QueryTool, arguments: Value) -> Result<sfmcp_mcp::DryRunResult> {
    build_query_text(&QueryBuilder::new(), &config.query, tool.into(), arguments)
        .map_err(|e| anyhow::anyhow!("{}", e))
}

pub fn execute(config: &SfmcpConfig, args: SoqlArgs) -> Result<()> {
    let arguments = read_arguments(&args)?;
    let built = render(config, args.tool, arguments)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&built)?);
    } else {
        println!("{}", built.query);
    }
    Ok(())
}
