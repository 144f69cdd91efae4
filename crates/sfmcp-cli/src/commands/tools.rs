//! Tools introspection.
//!
//! `sfmcp tools` lists the tools the server would register.
//! `sfmcp tools <name>` prints one tool's description and input schema.

use anyhow::Result;
use clap::Args;
use sfmcp_core::SfmcpConfig;
use sfmcp_mcp::{all_tools, ToolDefinition, ToolKind};

/// Arguments for `sfmcp tools`.
#[derive(Debug, Args)]
pub struct ToolsArgs {
    /// Show one tool in detail.
    pub name: Option<String>,

    /// List as if the server ran in read-only mode.
    #[arg(long)]
    pub read_only: bool,

    /// Include input schemas in the listing.
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn execute(config: &SfmcpConfig, args: ToolsArgs) -> Result<()> {
    match &args.name {
        Some(name) => describe(name),
        None => list(&all_tools(config.mcp.read_only || args.read_only), args.verbose),
    }
}

fn badges(tool: &ToolDefinition) -> String {
    let annotations = tool.annotations.as_ref();
    let mut badges = vec![if annotations.is_some_and(|a| a.read_only == Some(true)) {
        "read"
    } else {
        "write"
    }];
    if annotations.is_some_and(|a| a.dry_run_supported == Some(true)) {
        badges.push("dry-run");
    }
    badges.join(", ")
}

fn list(tools: &[ToolDefinition], verbose: bool) -> Result<()> {
    println!("Tools ({}):", tools.len());
    for tool in tools {
        println!("  {} ({})", tool.name, badges(tool));
        if let Some(desc) = &tool.description {
            println!("    {}", desc);
        }
        if verbose {
            println!(
                "    Schema: {}",
                serde_json::to_string_pretty(&tool.input_schema)?
            );
        }
    }
    Ok(())
}

fn describe(name: &str) -> Result<()> {
    let kind: ToolKind = name.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let tool = kind.definition();

    println!("Tool: {} ({})", tool.name, badges(&tool));
    if let Some(desc) = &tool.description {
        println!("\n{}", desc);
    }
    println!("\nInput Schema:");
    println!("{}", serde_json::to_string_pretty(&tool.input_schema)?);
    Ok(())
}
