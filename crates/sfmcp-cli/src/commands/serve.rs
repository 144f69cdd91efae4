//! `sfmcp serve` - authenticate against the org and run the MCP server.

use anyhow::{Context, Result};
use clap::Args;
use sfmcp_client::RestClient;
use sfmcp_core::{AuthConfig, SfmcpConfig, Transport};
use sfmcp_mcp::{McpServer, ToolExecutor};
use std::sync::Arc;

/// Arguments for `sfmcp serve`. Flags override the config file.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Transport type (stdio or http).
    #[arg(long)]
    pub transport: Option<Transport>,

    /// HTTP port (only for http transport).
    #[arg(long)]
    pub port: Option<u16>,

    /// HTTP bind host (only for http transport).
    #[arg(long)]
    pub host: Option<String>,

    /// Hide and refuse write tools.
    #[arg(long)]
    pub read_only: bool,

    /// Org instance URL.
    #[arg(long, env = "SALESFORCE_INSTANCE_URL")]
    pub instance_url: Option<String>,

    /// Pre-issued access token. Replaces the configured auth method.
    #[arg(long, env = "SALESFORCE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
}

impl ServeArgs {
    fn apply(self, config: &mut SfmcpConfig) {
        if let Some(transport) = self.transport {
            config.mcp.transport = transport;
        }
        if let Some(port) = self.port {
            config.mcp.port = port;
        }
        if let Some(host) = self.host {
            config.mcp.host = host;
        }
        if self.read_only {
            config.mcp.read_only = true;
        }
        if let Some(url) = self.instance_url {
            config.salesforce.instance_url = Some(url);
            config.salesforce.instance_url_env = None;
        }
        if let Some(token) = self.access_token {
            config.salesforce.auth = AuthConfig::AccessToken {
                access_token: Some(token),
                access_token_env: None,
            };
        }
    }
}

pub async fn execute(mut config: SfmcpConfig, args: ServeArgs) -> Result<()> {
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        auth = config.salesforce.auth.method(),
        api_version = %config.salesforce.api_version,
        "Connecting to Salesforce"
    );
    let client = RestClient::connect(&config.salesforce)
        .await
        .context("Failed to connect to Salesforce")?;
    tracing::info!(instance = client.session().instance_url(), "Authenticated");

    let executor = ToolExecutor::new(Arc::new(client))
        .with_query_config(config.query.clone())
        .with_read_only(config.mcp.read_only);
    let server = McpServer::new(config.mcp, executor);

    server.run().await.context("MCP server failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ServeArgs {
        ServeArgs {
            transport: None,
            port: None,
            host: None,
            read_only: false,
            instance_url: None,
            access_token: None,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = SfmcpConfig::default();
        ServeArgs {
            transport: Some(Transport::Http),
            port: Some(8080),
            read_only: true,
            instance_url: Some("https://acme.my.salesforce.com".to_string()),
            ..args()
        }
        .apply(&mut config);

        assert_eq!(config.mcp.transport, Transport::Http);
        assert_eq!(config.mcp.bind_addr(), "127.0.0.1:8080");
        assert!(config.mcp.read_only);
        assert_eq!(
            config.salesforce.resolve_instance_url().as_deref(),
            Some("https://acme.my.salesforce.com")
        );
    }

    #[test]
    fn test_access_token_flag_replaces_auth_method() {
        let mut config = SfmcpConfig::from_yaml(
            "salesforce:\n  auth:\n    method: client_credentials\n    client_id: id\n",
        )
        .unwrap();
        ServeArgs {
            access_token: Some("00Dxx!token".to_string()),
            ..args()
        }
        .apply(&mut config);

        assert_eq!(config.salesforce.auth.method(), "access_token");
        assert!(config.salesforce.auth.resolve().is_ok());
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let mut config = SfmcpConfig::from_yaml("mcp:\n  port: 4000\n").unwrap();
        args().apply(&mut config);
        assert_eq!(config.mcp.port, 4000);
        assert_eq!(config.mcp.transport, Transport::Stdio);
    }
}
