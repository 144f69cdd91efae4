use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{check, serve, soql, tools};

#[derive(Parser, Debug)]
#[command(name = "sfmcp", version, about = "Salesforce MCP server")]
struct Cli {
    /// Configuration file.
    #[arg(short, long, global = true, env = "SFMCP_CONFIG", default_value = "sfmcp.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect to Salesforce and serve MCP tools over stdio or HTTP.
    Serve(serve::ServeArgs),

    /// Build the SOQL/SOSL a query tool would run, without connecting.
    Soql(soql::SoqlArgs),

    /// List the MCP tools or print one tool's input schema.
    Tools(tools::ToolsArgs),

    /// Validate the configuration file and credentials.
    Check(check::CheckArgs),
}

/// Logs always go to stderr: stdout carries the stdio transport and
/// command output.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = commands::load_config(&cli.config)?;
    init_tracing(&loaded.config.logging.level);
    if !loaded.found {
        tracing::warn!(config = %cli.config.display(), "Config file not found, using defaults");
    }

    match cli.cmd {
        Command::Serve(args) => serve::execute(loaded.config, args).await?,
        Command::Soql(args) => soql::execute(&loaded.config, args)?,
        Command::Tools(args) => tools::execute(&loaded.config, args)?,
        Command::Check(args) => check::execute(&cli.config, loaded, args).await?,
    }

    Ok(())
}
