//! Salesforce org connection settings.

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Connection settings for the target org.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesforceConfig {
    /// Instance URL, e.g. `https://acme.my.salesforce.com`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_url: Option<String>,

    /// Environment variable holding the instance URL. Takes precedence.
    #[serde(default = "default_instance_url_env")]
    pub instance_url_env: Option<String>,

    /// Login host used for OAuth token requests.
    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// REST API version, e.g. `62.0`.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How to obtain an access token.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for SalesforceConfig {
    fn default() -> Self {
        Self {
            instance_url: None,
            instance_url_env: default_instance_url_env(),
            login_url: default_login_url(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            auth: AuthConfig::default(),
        }
    }
}

impl SalesforceConfig {
    /// Resolve the instance URL, preferring the environment variable.
    pub fn resolve_instance_url(&self) -> Option<String> {
        resolve_secret(self.instance_url.as_deref(), self.instance_url_env.as_deref())
            .map(|url| url.trim_end_matches('/').to_string())
    }

    /// Check that the API version looks like `NN.N`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = self
            .api_version
            .split_once('.')
            .map(|(major, minor)| {
                !major.is_empty()
                    && !minor.is_empty()
                    && major.chars().all(|c| c.is_ascii_digit())
                    && minor.chars().all(|c| c.is_ascii_digit())
            })
            .unwrap_or(false);
        if !valid {
            return Err(ConfigError::Config(format!(
                "salesforce.api_version '{}' must look like 62.0",
                self.api_version
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Config(
                "salesforce.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Authentication method, tagged by `method`.
///
/// Every secret can be given literally or through a `*_env` variable name;
/// the environment variable wins when it is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Pre-issued access token (for example from `sf org display`).
    AccessToken {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        access_token: Option<String>,
        #[serde(default = "default_access_token_env")]
        access_token_env: Option<String>,
    },

    /// OAuth 2.0 client-credentials flow against a connected app.
    ClientCredentials {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_id_env: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_secret: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_secret_env: Option<String>,
    },

    /// OAuth 2.0 username-password flow.
    UsernamePassword {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_id_env: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_secret: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_secret_env: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username_env: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password_env: Option<String>,
        /// Appended to the password when the org requires it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        security_token: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        security_token_env: Option<String>,
    },
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig::AccessToken {
            access_token: None,
            access_token_env: default_access_token_env(),
        }
    }
}

/// Fully resolved credentials, ready for the token exchange.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    AccessToken(String),
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    UsernamePassword {
        client_id: String,
        client_secret: String,
        username: String,
        password: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Credentials::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            Credentials::UsernamePassword {
                client_id,
                username,
                ..
            } => f
                .debug_struct("UsernamePassword")
                .field("client_id", client_id)
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

impl AuthConfig {
    /// Name of the method as written in the config file.
    pub fn method(&self) -> &'static str {
        match self {
            AuthConfig::AccessToken { .. } => "access_token",
            AuthConfig::ClientCredentials { .. } => "client_credentials",
            AuthConfig::UsernamePassword { .. } => "username_password",
        }
    }

    /// Resolve every secret from the environment or the literal value.
    pub fn resolve(&self) -> Result<Credentials, ConfigError> {
        match self {
            AuthConfig::AccessToken {
                access_token,
                access_token_env,
            } => required("access_token", access_token, access_token_env)
                .map(Credentials::AccessToken),
            AuthConfig::ClientCredentials {
                client_id,
                client_id_env,
                client_secret,
                client_secret_env,
            } => Ok(Credentials::ClientCredentials {
                client_id: required("client_id", client_id, client_id_env)?,
                client_secret: required("client_secret", client_secret, client_secret_env)?,
            }),
            AuthConfig::UsernamePassword {
                client_id,
                client_id_env,
                client_secret,
                client_secret_env,
                username,
                username_env,
                password,
                password_env,
                security_token,
                security_token_env,
            } => {
                let mut password = required("password", password, password_env)?;
                if let Some(token) =
                    resolve_secret(security_token.as_deref(), security_token_env.as_deref())
                {
                    password.push_str(&token);
                }
                Ok(Credentials::UsernamePassword {
                    client_id: required("client_id", client_id, client_id_env)?,
                    client_secret: required("client_secret", client_secret, client_secret_env)?,
                    username: required("username", username, username_env)?,
                    password,
                })
            }
        }
    }
}

fn required(
    name: &str,
    value: &Option<String>,
    env: &Option<String>,
) -> Result<String, ConfigError> {
    resolve_secret(value.as_deref(), env.as_deref()).ok_or_else(|| {
        let hint = match env {
            Some(var) => format!(" (set {} or salesforce.auth.{})", var, name),
            None => format!(" (set salesforce.auth.{} or salesforce.auth.{}_env)", name, name),
        };
        ConfigError::Config(format!("missing Salesforce credential '{}'{}", name, hint))
    })
}

/// Environment variable first, then the literal. Empty values count as unset.
fn resolve_secret(value: Option<&str>, env: Option<&str>) -> Option<String> {
    env.and_then(|var| std::env::var(var).ok())
        .filter(|v| !v.is_empty())
        .or_else(|| value.filter(|v| !v.is_empty()).map(str::to_string))
}

fn default_instance_url_env() -> Option<String> {
    Some("SALESFORCE_INSTANCE_URL".to_string())
}

fn default_access_token_env() -> Option<String> {
    Some("SALESFORCE_ACCESS_TOKEN".to_string())
}

fn default_login_url() -> String {
    "https://login.salesforce.com".to_string()
}

fn default_api_version() -> String {
    "62.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
