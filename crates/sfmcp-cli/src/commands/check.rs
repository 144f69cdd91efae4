//! `sfmcp check` command implementation.
//!
//! Validates the configuration file and reports problems as findings:
//! - the file parses and its values are in range
//! - credentials for the selected auth method resolve
//! - ORDER BY allow-lists name valid fields
//!
//! With `--connect` it also authenticates and lists the org's objects.

use anyhow::{Context, Result};
use clap::Args;
use sfmcp_client::{RestClient, SalesforceClient};
use sfmcp_core::SfmcpConfig;
use sfmcp_soql::{validate_field_name, validate_object_name, OrderBy};
use std::path::Path;

use super::LoadedConfig;

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    /// Config section the finding is about, e.g. `salesforce.auth`.
    pub location: String,
    pub message: String,
}

impl CheckFinding {
    fn new(severity: Severity, location: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            location: location.to_string(),
            message: message.into(),
        }
    }
}

/// Arguments for `sfmcp check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Also authenticate against the org.
    #[arg(long)]
    pub connect: bool,
}

/// Static checks that need no network.
pub fn check_config(config: &SfmcpConfig) -> Vec<CheckFinding> {
    let mut findings = Vec::new();

    if let Err(e) = config.validate() {
        findings.push(CheckFinding::new(Severity::Error, "config", e.to_string()));
    }

    match config.salesforce.auth.resolve() {
        Ok(_) => findings.push(CheckFinding::new(
            Severity::Info,
            "salesforce.auth",
            format!("credentials for {} resolved", config.salesforce.auth.method()),
        )),
        Err(e) => findings.push(CheckFinding::new(Severity::Error, "salesforce.auth", e.to_string())),
    }

    let needs_instance_url = config.salesforce.auth.method() == "access_token";
    if needs_instance_url && config.salesforce.resolve_instance_url().is_none() {
        findings.push(CheckFinding::new(
            Severity::Error,
            "salesforce.instance_url",
            "access_token auth needs an instance URL",
        ));
    }

    let mut objects: Vec<_> = config.query.orderable_fields.iter().collect();
    objects.sort_by_key(|(object, _)| object.as_str());
    for (object, fields) in objects {
        let location = format!("query.orderable_fields.{}", object);
        if let Err(e) = validate_object_name(object) {
            findings.push(CheckFinding::new(Severity::Error, &location, e.to_string()));
        }
        for entry in fields {
            let valid = OrderBy::parse_list(entry).and_then(|parsed| {
                parsed
                    .iter()
                    .try_for_each(|o| validate_field_name(&o.field).map(|_| ()))
            });
            if let Err(e) = valid {
                findings.push(CheckFinding::new(Severity::Error, &location, e.to_string()));
            }
        }
    }

    if config.mcp.read_only {
        findings.push(CheckFinding::new(
            Severity::Info,
            "mcp.read_only",
            "write tools are disabled",
        ));
    }
    if config.mcp.is_http() && config.mcp.host != "127.0.0.1" && config.mcp.host != "localhost" {
        findings.push(CheckFinding::new(
            Severity::Warning,
            "mcp.host",
            format!("HTTP transport listens on {} without authentication", config.mcp.host),
        ));
    }

    findings
}

pub async fn execute(path: &Path, loaded: LoadedConfig, args: CheckArgs) -> Result<()> {
    if !loaded.found {
        anyhow::bail!("Config file {:?} not found", path);
    }

    let mut findings = check_config(&loaded.config);
    let has_errors = findings.iter().any(|f| f.severity == Severity::Error);

    if args.connect && !has_errors {
        let client = RestClient::connect(&loaded.config.salesforce)
            .await
            .context("Failed to connect to Salesforce")?;
        let objects = client
            .describe_global()
            .await
            .context("Failed to list objects")?;
        findings.push(CheckFinding::new(
            Severity::Info,
            "salesforce",
            format!(
                "connected to {} ({} objects)",
                client.session().instance_url(),
                objects.len()
            ),
        ));
    }

    println!("Checking {}", path.display());
    for finding in &findings {
        println!("  [{}] {}: {}", finding.severity, finding.location, finding.message);
    }

    if has_errors {
        anyhow::bail!("Configuration has errors");
    }
    println!("Configuration is valid");
    Ok(())
}
