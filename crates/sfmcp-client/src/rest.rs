//! `SalesforceClient` over the REST API.

use crate::auth::{authenticate, Session};
use crate::client::SalesforceClient;
use crate::error::ClientError;
use crate::types::{
    ApiError, DescribeGlobal, ObjectDescribe, QueryResult, Record, SObjectSummary, SaveResult,
    SearchResult,
};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use sfmcp_core::SalesforceConfig;
use std::time::Duration;

/// Stop following `nextRecordsUrl` after this many pages.
const MAX_QUERY_PAGES: usize = 100;

/// REST API client bound to one authenticated session.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    session: Session,
    api_version: String,
}

impl RestClient {
    /// Authenticate with the configured method and build a client.
    pub async fn connect(config: &SalesforceConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let session = authenticate(&http, config).await?;
        Ok(Self::with_session(http, session, &config.api_version))
    }

    /// Build a client around an existing session.
    pub fn with_session(http: reqwest::Client, session: Session, api_version: &str) -> Self {
        Self {
            http,
            session,
            api_version: api_version.to_string(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// `{instance}/services/data/v{version}/{segments...}` with each segment
    /// percent-encoded.
    fn data_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        for segment in segments {
            if segment.is_empty() || *segment == "." || *segment == ".." {
                return Err(ClientError::InvalidArgument(format!(
                    "'{}' cannot be used as a URL path segment",
                    segment
                )));
            }
        }
        let mut url = Url::parse(self.session.instance_url())
            .map_err(|e| ClientError::InvalidArgument(format!("instance URL: {}", e)))?;
        let version = format!("v{}", self.api_version);
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidArgument("instance URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["services", "data", version.as_str()])
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&Record>,
    ) -> Result<Option<T>, ClientError> {
        tracing::debug!(method = %method, path = %url.path(), "Salesforce request");
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(self.session.access_token());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let text = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        if text.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", e, truncate(&text))))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        self.send(Method::GET, url, None)
            .await?
            .ok_or_else(|| ClientError::InvalidResponse("empty response body".to_string()))
    }
}

fn api_error(status: StatusCode, body: &str) -> ClientError {
    let parsed: Option<ApiError> = serde_json::from_str::<Vec<ApiError>>(body)
        .ok()
        .and_then(|errors| errors.into_iter().next());
    match parsed {
        Some(err) => ClientError::Api {
            status: status.as_u16(),
            code: err.error_code,
            message: err.message,
        },
        None => ClientError::Api {
            status: status.as_u16(),
            code: status
                .canonical_reason()
                .unwrap_or("UNKNOWN")
                .to_uppercase()
                .replace(' ', "_"),
            message: truncate(body).to_string(),
        },
    }
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(500) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl SalesforceClient for RestClient {
    async fn query(&self, soql: &str) -> Result<QueryResult, ClientError> {
        let mut url = self.data_url(&["query"])?;
        url.query_pairs_mut().append_pair("q", soql);
        let mut result: QueryResult = self.get(url).await?;

        let mut pages = 1;
        while !result.done {
            let Some(next) = result.next_records_url.take() else {
                break;
            };
            if pages >= MAX_QUERY_PAGES {
                tracing::warn!(pages, "Query result truncated after page limit");
                result.next_records_url = Some(next);
                break;
            }
            let next_url = Url::parse(self.session.instance_url())
                .and_then(|base| base.join(&next))
                .map_err(|e| ClientError::InvalidResponse(format!("nextRecordsUrl: {}", e)))?;
            let page: QueryResult = self.get(next_url).await?;
            result.records.extend(page.records);
            result.done = page.done;
            result.next_records_url = page.next_records_url;
            pages += 1;
        }
        Ok(result)
    }

    async fn search(&self, sosl: &str) -> Result<SearchResult, ClientError> {
        let mut url = self.data_url(&["search"])?;
        url.query_pairs_mut().append_pair("q", sosl);
        self.get(url).await
    }

    async fn describe(&self, object: &str) -> Result<ObjectDescribe, ClientError> {
        self.get(self.data_url(&["sobjects", object, "describe"])?).await
    }

    async fn describe_global(&self) -> Result<Vec<SObjectSummary>, ClientError> {
        let global: DescribeGlobal = self.get(self.data_url(&["sobjects"])?).await?;
        Ok(global.sobjects)
    }

    async fn create(&self, object: &str, record: &Record) -> Result<SaveResult, ClientError> {
        let url = self.data_url(&["sobjects", object])?;
        self.send(Method::POST, url, Some(record))
            .await?
            .ok_or_else(|| ClientError::InvalidResponse("create returned no body".to_string()))
    }

    async fn update(&self, object: &str, id: &str, record: &Record) -> Result<SaveResult, ClientError> {
        let url = self.data_url(&["sobjects", object, id])?;
        self.send::<serde_json::Value>(Method::PATCH, url, Some(record))
            .await?;
        Ok(SaveResult::ok(Some(id.to_string())))
    }

    async fn upsert(
        &self,
        object: &str,
        external_id_field: &str,
        external_id: &str,
        record: &Record,
    ) -> Result<SaveResult, ClientError> {
        let url = self.data_url(&["sobjects", object, external_id_field, external_id])?;
        match self.send::<SaveResult>(Method::PATCH, url, Some(record)).await? {
            Some(result) => Ok(result),
            None => Ok(SaveResult {
                created: Some(false),
                ..SaveResult::ok(None)
            }),
        }
    }

    async fn delete(&self, object: &str, id: &str) -> Result<SaveResult, ClientError> {
        let url = self.data_url(&["sobjects", object, id])?;
        self.send::<serde_json::Value>(Method::DELETE, url, None).await?;
        Ok(SaveResult::ok(Some(id.to_string())))
    }
}
