//! Access token acquisition.

use crate::error::ClientError;
use serde::Deserialize;
use sfmcp_core::{Credentials, SalesforceConfig};

/// An authenticated connection to one org.
#[derive(Clone)]
pub struct Session {
    instance_url: String,
    access_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("instance_url", &self.instance_url)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Obtain a session using the configured authentication method.
pub async fn authenticate(
    http: &reqwest::Client,
    config: &SalesforceConfig,
) -> Result<Session, ClientError> {
    let credentials = config.auth.resolve()?;
    let instance_url = config.resolve_instance_url();

    let session = match credentials {
        Credentials::AccessToken(token) => {
            let instance_url = instance_url.ok_or_else(|| {
                ClientError::Auth(
                    "access_token authentication requires salesforce.instance_url".to_string(),
                )
            })?;
            Session::new(instance_url, token)
        }
        Credentials::ClientCredentials {
            client_id,
            client_secret,
        } => {
            // The client-credentials flow is only served from the org's own domain.
            let host = instance_url.unwrap_or_else(|| config.login_url.clone());
            request_token(
                http,
                &host,
                &[
                    ("grant_type", "client_credentials"),
                    ("client_id", &client_id),
                    ("client_secret", &client_secret),
                ],
            )
            .await?
        }
        Credentials::UsernamePassword {
            client_id,
            client_secret,
            username,
            password,
        } => {
            request_token(
                http,
                &config.login_url,
                &[
                    ("grant_type", "password"),
                    ("client_id", &client_id),
                    ("client_secret", &client_secret),
                    ("username", &username),
                    ("password", &password),
                ],
            )
            .await?
        }
    };

    tracing::info!(
        instance_url = %session.instance_url(),
        method = config.auth.method(),
        "Authenticated with Salesforce"
    );
    Ok(session)
}

async fn request_token(
    http: &reqwest::Client,
    host: &str,
    params: &[(&str, &str)],
) -> Result<Session, ClientError> {
    let url = format!("{}/services/oauth2/token", host.trim_end_matches('/'));
    let response = http.post(&url).form(params).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let reason = match serde_json::from_str::<TokenError>(&body) {
            Ok(err) => match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            },
            Err(_) => format!("HTTP {}: {}", status.as_u16(), body),
        };
        return Err(ClientError::Auth(reason));
    }

    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| ClientError::InvalidResponse(format!("token response: {}", e)))?;
    Ok(Session::new(token.instance_url, token.access_token))
}
