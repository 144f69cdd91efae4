//! The client capability the tool handlers depend on.

use crate::error::ClientError;
use crate::types::{ObjectDescribe, QueryResult, Record, SObjectSummary, SaveResult, SearchResult};
use async_trait::async_trait;

/// Operations the MCP tools need from a Salesforce org.
///
/// Query and search text is executed as given; callers are responsible for
/// building it with the validated builders.
#[async_trait]
pub trait SalesforceClient: Send + Sync {
    /// Run a SOQL query, following pagination until the result is complete.
    async fn query(&self, soql: &str) -> Result<QueryResult, ClientError>;

    /// Run a SOSL search.
    async fn search(&self, sosl: &str) -> Result<SearchResult, ClientError>;

    /// Describe one object.
    async fn describe(&self, object: &str) -> Result<ObjectDescribe, ClientError>;

    /// List every object in the org.
    async fn describe_global(&self) -> Result<Vec<SObjectSummary>, ClientError>;

    async fn create(&self, object: &str, record: &Record) -> Result<SaveResult, ClientError>;

    async fn update(&self, object: &str, id: &str, record: &Record)
    -> Result<SaveResult, ClientError>;

    /// Insert or update by external ID.
    async fn upsert(
        &self,
        object: &str,
        external_id_field: &str,
        external_id: &str,
        record: &Record,
    ) -> Result<SaveResult, ClientError>;

    async fn delete(&self, object: &str, id: &str) -> Result<SaveResult, ClientError>;
}
