//! Shared fixtures: an in-memory Salesforce and helpers for calling tools.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use sfmcp_client::{
    ClientError, FieldDescribe, ObjectDescribe, PicklistValue, QueryResult, Record,
    SObjectSummary, SaveResult, SalesforceClient, SearchResult,
};
use sfmcp_core::{McpConfig, QueryConfig};
use sfmcp_mcp::{JsonRpcRequest, JsonRpcResponse, McpServer, ToolExecutor};
use std::sync::{Arc, Mutex};

/// One call the fake received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query(String),
    Search(String),
    Describe(String),
    DescribeGlobal,
    Create(String, Record),
    Update(String, String, Record),
    Upsert(String, String, String, Record),
    Delete(String, String),
}

/// In-memory `SalesforceClient` that records every call.
#[derive(Default)]
pub struct FakeSalesforce {
    calls: Mutex<Vec<Call>>,
}

impl FakeSalesforce {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Query(q) | Call::Search(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn field(name: &str, field_type: &str) -> FieldDescribe {
    serde_json::from_value(json!({
        "name": name,
        "label": name,
        "type": field_type,
        "createable": true,
        "updateable": true
    }))
    .unwrap()
}

#[async_trait]
impl SalesforceClient for FakeSalesforce {
    async fn query(&self, soql: &str) -> Result<QueryResult, ClientError> {
        self.record(Call::Query(soql.to_string()));
        Ok(QueryResult {
            total_size: 2,
            done: true,
            next_records_url: None,
            records: vec![
                json!({
                    "attributes": {"type": "Account", "url": "/services/data/v62.0/sobjects/Account/001A"},
                    "Id": "001000000000001AAA",
                    "Name": "Acme"
                }),
                json!({
                    "attributes": {"type": "Account", "url": "/services/data/v62.0/sobjects/Account/001B"},
                    "Id": "001000000000002AAA",
                    "Name": "Globex"
                }),
            ],
        })
    }

    async fn search(&self, sosl: &str) -> Result<SearchResult, ClientError> {
        self.record(Call::Search(sosl.to_string()));
        Ok(SearchResult {
            search_records: vec![
                json!({"attributes": {"type": "Account"}, "Id": "001000000000001AAA", "Name": "Acme"}),
                json!({"attributes": {"type": "Contact"}, "Id": "003000000000001AAA", "Name": "Ada Acme"}),
            ],
        })
    }

    async fn describe(&self, object: &str) -> Result<ObjectDescribe, ClientError> {
        self.record(Call::Describe(object.to_string()));
        if object != "Account" {
            return Err(ClientError::Api {
                status: 404,
                code: "NOT_FOUND".to_string(),
                message: format!("The requested resource does not exist: {}", object),
            });
        }
        let mut industry = field("Industry", "picklist");
        industry.picklist_values = vec![
            PicklistValue {
                value: "Technology".to_string(),
                label: None,
                active: true,
            },
            PicklistValue {
                value: "Retired".to_string(),
                label: None,
                active: false,
            },
        ];
        Ok(ObjectDescribe {
            name: "Account".to_string(),
            label: "Account".to_string(),
            label_plural: "Accounts".to_string(),
            custom: false,
            queryable: true,
            createable: true,
            updateable: true,
            deletable: true,
            fields: vec![field("Id", "id"), field("Name", "string"), industry],
            child_relationships: Vec::new(),
        })
    }

    async fn describe_global(&self) -> Result<Vec<SObjectSummary>, ClientError> {
        self.record(Call::DescribeGlobal);
        Ok(["Contact", "Account", "Invoice__c", "AccountContactRelation"]
            .into_iter()
            .map(|name| SObjectSummary {
                name: name.to_string(),
                label: name.trim_end_matches("__c").to_string(),
                custom: name.ends_with("__c"),
                queryable: true,
            })
            .collect())
    }

    async fn create(&self, object: &str, record: &Record) -> Result<SaveResult, ClientError> {
        self.record(Call::Create(object.to_string(), record.clone()));
        if record.get("Name") == Some(&json!("")) {
            return Err(ClientError::Api {
                status: 400,
                code: "REQUIRED_FIELD_MISSING".to_string(),
                message: "Required fields are missing: [Name]".to_string(),
            });
        }
        Ok(saved("001000000000NEWAAA", None))
    }

    async fn update(&self, object: &str, id: &str, record: &Record) -> Result<SaveResult, ClientError> {
        self.record(Call::Update(object.to_string(), id.to_string(), record.clone()));
        Ok(saved(id, None))
    }

    async fn upsert(
        &self,
        object: &str,
        external_id_field: &str,
        external_id: &str,
        record: &Record,
    ) -> Result<SaveResult, ClientError> {
        self.record(Call::Upsert(
            object.to_string(),
            external_id_field.to_string(),
            external_id.to_string(),
            record.clone(),
        ));
        Ok(saved("001000000000UPSAAA", Some(true)))
    }

    async fn delete(&self, object: &str, id: &str) -> Result<SaveResult, ClientError> {
        self.record(Call::Delete(object.to_string(), id.to_string()));
        Ok(saved(id, None))
    }
}

fn saved(id: &str, created: Option<bool>) -> SaveResult {
    SaveResult {
        id: Some(id.to_string()),
        success: true,
        errors: Vec::new(),
        created,
    }
}

pub struct TestContext {
    pub salesforce: Arc<FakeSalesforce>,
    pub server: McpServer,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(McpConfig::default(), QueryConfig::default())
    }

    pub fn with_config(mcp: McpConfig, query: QueryConfig) -> Self {
        let salesforce = FakeSalesforce::new();
        let executor = ToolExecutor::new(salesforce.clone()).with_query_config(query);
        Self {
            server: McpServer::new(mcp, executor),
            salesforce,
        }
    }

    pub fn read_only() -> Self {
        let mcp = McpConfig {
            read_only: true,
            ..McpConfig::default()
        };
        Self::with_config(mcp, QueryConfig::default())
    }

    pub async fn request(&self, method: &str, params: Option<Value>) -> JsonRpcResponse {
        self.server
            .handle_request(JsonRpcRequest::new(1, method, params))
            .await
            .expect("request with an id must get a response")
    }

    /// Call a tool and return the `tools/call` result object.
    pub async fn call(&self, tool: &str, arguments: Value) -> Value {
        self.call_with(tool, arguments, json!({})).await
    }

    pub async fn call_with(&self, tool: &str, arguments: Value, options: Value) -> Value {
        let response = self
            .request(
                "tools/call",
                Some(json!({"name": tool, "arguments": arguments, "options": options})),
            )
            .await;
        assert!(response.error.is_none(), "unexpected JSON-RPC error: {:?}", response.error);
        response.result.expect("tools/call result")
    }
}

pub fn is_error(result: &Value) -> bool {
    result["isError"].as_bool().unwrap_or(false)
}

pub fn text(result: &Value) -> &str {
    result["content"][0]["text"].as_str().expect("text content")
}

/// Parse the JSON payload of a successful tool result.
pub fn payload(result: &Value) -> Value {
    assert!(!is_error(result), "tool failed: {}", text(result));
    serde_json::from_str(text(result)).expect("tool output is JSON")
}

/// Assert the tool failed with a message containing `needle`.
pub fn assert_tool_error(result: &Value, needle: &str) {
    assert!(is_error(result), "expected an error, got: {}", result);
    assert!(
        text(result).contains(needle),
        "error {:?} does not mention {:?}",
        text(result),
        needle
    );
}
