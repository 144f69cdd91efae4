//! Per-tool argument types and handlers.
//!
//! Query tools are split into a pure `build_*` step producing the query text
//! (shared by dry runs) and the client call made by the executor.

use crate::error::McpError;
use crate::format;
use serde::Deserialize;
use serde_json::Value;
use sfmcp_client::{Record, SalesforceClient, SaveResult};
use sfmcp_core::QueryConfig;
use sfmcp_soql::{
    validate_field_name, validate_object_name, AggregateRequest, BestEffortSanitizer, Condition,
    FieldShape, GroupBy, OrderBy, QueryBuilder, QueryRequest, ReturningObject, SafeBuilder,
    SearchRequest, SearchScope, SoqlError,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchObjectsArgs {
    pub search_pattern: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeObjectArgs {
    pub object_name: String,
}

/// ORDER BY as free text or as structured entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OrderByArg {
    Text(String),
    Entries(Vec<OrderBy>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecordsArgs {
    pub object_name: String,
    pub fields: Vec<String>,
    #[serde(default, rename = "where")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub where_clause: Option<String>,
    #[serde(default)]
    pub order_by: Option<OrderByArg>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateQueryArgs {
    pub object_name: String,
    pub select_fields: Vec<String>,
    #[serde(default)]
    pub group_by_fields: Vec<GroupBy>,
    #[serde(default, rename = "where")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub where_clause: Option<String>,
    #[serde(default)]
    pub having_clause: Option<String>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAllArgs {
    pub search_term: String,
    #[serde(default)]
    pub search_in: SearchScope,
    #[serde(default)]
    pub objects: Vec<ReturningObject>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DmlOperation {
    Insert,
    Update,
    Upsert,
    Delete,
}

impl DmlOperation {
    fn as_str(&self) -> &'static str {
        match self {
            DmlOperation::Insert => "insert",
            DmlOperation::Update => "update",
            DmlOperation::Upsert => "upsert",
            DmlOperation::Delete => "delete",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmlRecordsArgs {
    pub operation: DmlOperation,
    pub object_name: String,
    pub records: Vec<Record>,
    #[serde(default)]
    pub external_id_field: Option<String>,
}

pub async fn search_objects(
    client: &dyn SalesforceClient,
    args: SearchObjectsArgs,
) -> Result<Value, McpError> {
    let pattern = args.search_pattern.trim().to_lowercase();
    let objects = client.describe_global().await?;

    let mut matches: Vec<_> = objects
        .iter()
        .filter(|o| {
            o.name.to_lowercase().contains(&pattern) || o.label.to_lowercase().contains(&pattern)
        })
        .collect();
    matches.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(format::object_summaries(&matches))
}

pub async fn describe_object(
    client: &dyn SalesforceClient,
    args: DescribeObjectArgs,
) -> Result<Value, McpError> {
    let object = validate_object_name(&args.object_name)?;
    let describe = client.describe(object).await?;
    Ok(format::describe(&describe))
}

/// Requested limit, or the configured default, bounded by the configured cap.
fn effective_limit(
    config: &QueryConfig,
    requested: Option<i64>,
    use_default: bool,
) -> Result<Option<i64>, SoqlError> {
    match requested {
        Some(limit) if limit > i64::from(config.max_limit) => {
            Err(SoqlError::invalid_limit(limit, config.max_limit))
        }
        Some(limit) => Ok(Some(limit)),
        None if use_default => Ok(config.default_limit.map(i64::from)),
        None => Ok(None),
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

pub fn build_query(
    builder: &QueryBuilder,
    config: &QueryConfig,
    args: QueryRecordsArgs,
) -> Result<String, McpError> {
    let mut request = QueryRequest::new(args.object_name, args.fields);
    request.conditions = args.conditions;

    if let Some(clause) = non_blank(args.where_clause) {
        request = request.with_where_clause(builder.sanitizer().sanitize(&clause)?);
    }

    request.order_by = match args.order_by {
        Some(OrderByArg::Text(text)) if !text.trim().is_empty() => OrderBy::parse_list(&text)?,
        Some(OrderByArg::Entries(entries)) => entries,
        _ => Vec::new(),
    };
    request.limit = effective_limit(config, args.limit, true)?;

    if let Some(orderable) = config.orderable_fields_for(&request.object) {
        request = request.with_orderable_fields(orderable.to_vec());
    }

    Ok(builder.build_query(&request)?)
}

pub fn build_aggregate(
    builder: &QueryBuilder,
    config: &QueryConfig,
    args: AggregateQueryArgs,
) -> Result<String, McpError> {
    let request = AggregateRequest {
        object: args.object_name,
        select_fields: args.select_fields,
        group_by: args.group_by_fields,
        conditions: args.conditions,
        where_clause: non_blank(args.where_clause),
        having_clause: non_blank(args.having_clause),
        order_by: non_blank(args.order_by),
        limit: effective_limit(config, args.limit, false)?,
    };
    Ok(builder.build_aggregate_query(&request)?)
}

pub fn build_search(builder: &QueryBuilder, args: SearchAllArgs) -> Result<String, McpError> {
    let request = SearchRequest {
        term: args.search_term,
        scope: args.search_in,
        returning: args.objects,
        limit: args.limit,
    };
    Ok(builder.build_search(&request)?)
}

/// Record IDs are 15 or 18 alphanumeric characters.
fn is_record_id(id: &str) -> bool {
    (id.len() == 15 || id.len() == 18) && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Keys of a DML record must be plain fields of the object itself.
fn validate_record_field(name: &str) -> Result<(), SoqlError> {
    let field = validate_field_name(name)?;
    if *field.shape() != FieldShape::Path || name.contains('.') {
        return Err(SoqlError::field_not_allowed(
            name,
            "records can only set plain fields of the target object",
        ));
    }
    Ok(())
}

fn record_id(record: &Record, index: usize) -> Result<String, McpError> {
    let id = record.get("Id").and_then(Value::as_str).ok_or_else(|| {
        McpError::invalid_arguments("salesforce_dml_records", format!("record {} has no Id", index))
    })?;
    if !is_record_id(id) {
        return Err(McpError::invalid_arguments(
            "salesforce_dml_records",
            format!("record {}: '{}' is not a record ID", index, id),
        ));
    }
    Ok(id.to_string())
}

fn external_id_value(record: &Record, field: &str, index: usize) -> Result<String, McpError> {
    match record.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(McpError::invalid_arguments(
            "salesforce_dml_records",
            format!("record {} has no value for external ID field {}", index, field),
        )),
    }
}

/// One validated unit of DML work.
enum DmlStep {
    Create(Record),
    Update(String, Record),
    Upsert(String, Record),
    Delete(String),
}

fn plan_dml(args: &DmlRecordsArgs) -> Result<Vec<DmlStep>, McpError> {
    let external_field = match (args.operation, &args.external_id_field) {
        (DmlOperation::Upsert, Some(field)) => {
            validate_record_field(field)?;
            Some(field.as_str())
        }
        (DmlOperation::Upsert, None) => {
            return Err(McpError::invalid_arguments(
                "salesforce_dml_records",
                "upsert requires externalIdField",
            ));
        }
        _ => None,
    };

    args.records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            for key in record.keys() {
                validate_record_field(key)?;
            }
            let mut body = record.clone();
            let step = match args.operation {
                DmlOperation::Insert => {
                    if body.contains_key("Id") {
                        return Err(McpError::invalid_arguments(
                            "salesforce_dml_records",
                            format!("record {}: Id cannot be set on insert", index),
                        ));
                    }
                    DmlStep::Create(body)
                }
                DmlOperation::Update => {
                    let id = record_id(record, index)?;
                    body.remove("Id");
                    DmlStep::Update(id, body)
                }
                DmlOperation::Upsert => {
                    let field = external_field.unwrap_or_default();
                    let value = external_id_value(record, field, index)?;
                    body.remove(field);
                    body.remove("Id");
                    DmlStep::Upsert(value, body)
                }
                DmlOperation::Delete => DmlStep::Delete(record_id(record, index)?),
            };
            Ok(step)
        })
        .collect()
}

/// Validate every record first, then apply them one at a time. A failing
/// record does not stop the others.
pub async fn dml_records(
    client: &dyn SalesforceClient,
    args: DmlRecordsArgs,
) -> Result<Value, McpError> {
    let object = validate_object_name(&args.object_name)?.to_string();
    let steps = plan_dml(&args)?;
    let external_field = args.external_id_field.clone().unwrap_or_default();

    let mut results = Vec::with_capacity(steps.len());
    let mut succeeded = 0usize;
    for (index, step) in steps.into_iter().enumerate() {
        let outcome: Result<SaveResult, String> = match step {
            DmlStep::Create(body) => client.create(&object, &body).await,
            DmlStep::Update(id, body) => client.update(&object, &id, &body).await,
            DmlStep::Upsert(value, body) => {
                client.upsert(&object, &external_field, &value, &body).await
            }
            DmlStep::Delete(id) => client.delete(&object, &id).await,
        }
        .map_err(|e| e.to_string());

        if matches!(&outcome, Ok(r) if r.success) {
            succeeded += 1;
        } else {
            tracing::warn!(object = %object, index, "DML record failed");
        }
        results.push(format::save_outcome(index, outcome));
    }

    let total = results.len();
    Ok(serde_json::json!({
        "operation": args.operation.as_str(),
        "object": object,
        "total": total,
        "succeeded": succeeded,
        "failed": total - succeeded,
        "results": results,
    }))
}
