//! Static definitions of the Salesforce tools.
//!
//! | Tool | Calls |
//! |------|-------|
//! | `salesforce_search_objects` | describe global, filtered by name or label |
//! | `salesforce_describe_object` | describe one object |
//! | `salesforce_query_records` | structured SOQL SELECT |
//! | `salesforce_aggregate_query` | SOQL with GROUP BY / HAVING |
//! | `salesforce_search_all` | SOSL FIND across objects |
//! | `salesforce_dml_records` | insert, update, upsert or delete |

use crate::protocol::{ToolAnnotations, ToolDefinition};
use serde_json::{json, Value};
use sfmcp_soql::MAX_SEARCH_LIMIT;
use std::fmt;
use std::str::FromStr;

/// The tools this server knows how to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    SearchObjects,
    DescribeObject,
    QueryRecords,
    AggregateQuery,
    SearchAll,
    DmlRecords,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::SearchObjects,
        ToolKind::DescribeObject,
        ToolKind::QueryRecords,
        ToolKind::AggregateQuery,
        ToolKind::SearchAll,
        ToolKind::DmlRecords,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::SearchObjects => "salesforce_search_objects",
            ToolKind::DescribeObject => "salesforce_describe_object",
            ToolKind::QueryRecords => "salesforce_query_records",
            ToolKind::AggregateQuery => "salesforce_aggregate_query",
            ToolKind::SearchAll => "salesforce_search_all",
            ToolKind::DmlRecords => "salesforce_dml_records",
        }
    }

    /// Whether the tool changes data in the org.
    pub fn is_write(&self) -> bool {
        matches!(self, ToolKind::DmlRecords)
    }

    /// Whether `dryRun` can return the query text for this tool.
    pub fn supports_dry_run(&self) -> bool {
        matches!(
            self,
            ToolKind::QueryRecords | ToolKind::AggregateQuery | ToolKind::SearchAll
        )
    }

    pub fn definition(&self) -> ToolDefinition {
        let (description, input_schema) = match self {
            ToolKind::SearchObjects => (
                "Find Salesforce objects whose API name or label contains the given text \
                 (case-insensitive). Use this to discover object names before querying.",
                search_objects_schema(),
            ),
            ToolKind::DescribeObject => (
                "Describe a Salesforce object: its fields with types, picklist values, \
                 relationships and permissions.",
                describe_object_schema(),
            ),
            ToolKind::QueryRecords => (
                "Query records with a structured SOQL SELECT. Conditions in `where` are ANDed \
                 and every field and value is validated and escaped. Use `whereClause` only \
                 for filters the structured form cannot express, such as OR logic. \
                 Relationship fields (Account.Name) and child subqueries \
                 ((SELECT Id FROM Contacts)) are supported.",
                query_records_schema(),
            ),
            ToolKind::AggregateQuery => (
                "Run an aggregate SOQL query (COUNT, SUM, AVG, MIN, MAX, COUNT_DISTINCT) \
                 with GROUP BY. Every non-aggregate field in `selectFields` must appear in \
                 `groupByFields`. Filter groups with `havingClause`.",
                aggregate_query_schema(),
            ),
            ToolKind::SearchAll => (
                "Search text across several objects at once with SOSL. Returns matching \
                 records per object. The `*` and `?` wildcards are allowed in the term.",
                search_all_schema(),
            ),
            ToolKind::DmlRecords => (
                "Insert, update, upsert or delete records. Each record is processed \
                 individually and the result lists the outcome per record.",
                dml_records_schema(),
            ),
        };

        ToolDefinition {
            name: self.name().to_string(),
            description: Some(description.to_string()),
            input_schema,
            annotations: Some(ToolAnnotations {
                title: None,
                read_only: Some(!self.is_write()),
                destructive: Some(self.is_write()),
                dry_run_supported: Some(self.supports_dry_run()),
            }),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown tool '{}'", s))
    }
}

/// Definitions of every tool, minus write tools when `read_only` is set.
pub fn all_tools(read_only: bool) -> Vec<ToolDefinition> {
    ToolKind::ALL
        .iter()
        .filter(|kind| !(read_only && kind.is_write()))
        .map(ToolKind::definition)
        .collect()
}

fn object_name_property() -> Value {
    json!({
        "type": "string",
        "description": "API name of the object, e.g. Account or Invoice__c",
        "minLength": 1,
        "maxLength": 255
    })
}

fn condition_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "field": {
                "type": "string",
                "description": "Field or relationship path, e.g. Name or Account.Industry"
            },
            "operator": {
                "type": "string",
                "description": "One of = != <> < > <= >= LIKE IN NOT IN INCLUDES EXCLUDES"
            },
            "value": {
                "description": "String, number, boolean, null, an array for IN/NOT IN/INCLUDES/EXCLUDES, \
                                or {\"date\": \"YYYY-MM-DD\"}, {\"datetime\": \"RFC3339\"}, \
                                {\"dateLiteral\": \"LAST_N_DAYS:30\"}"
            }
        },
        "required": ["field", "operator"],
        "additionalProperties": false
    })
}

fn conditions_property() -> Value {
    json!({
        "type": "array",
        "description": "Conditions ANDed together",
        "items": condition_schema()
    })
}

fn order_by_entry_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "field": { "type": "string" },
            "direction": { "type": "string", "enum": ["ASC", "DESC", "asc", "desc"] }
        },
        "required": ["field"],
        "additionalProperties": false
    })
}

fn limit_property(max: u32) -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "maximum": max
    })
}

fn search_objects_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "searchPattern": {
                "type": "string",
                "description": "Text to look for in object names and labels",
                "minLength": 1
            }
        },
        "required": ["searchPattern"],
        "additionalProperties": false
    })
}

fn describe_object_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "objectName": object_name_property()
        },
        "required": ["objectName"],
        "additionalProperties": false
    })
}

fn query_records_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "objectName": object_name_property(),
            "fields": {
                "type": "array",
                "description": "Fields to select; relationship paths and child subqueries allowed",
                "items": { "type": "string" },
                "minItems": 1
            },
            "where": conditions_property(),
            "whereClause": {
                "type": "string",
                "description": "Free-text filter ANDed with `where`. Checked against a deny-list only."
            },
            "orderBy": {
                "description": "Either \"Name DESC, CreatedDate\" or a list of {field, direction}",
                "oneOf": [
                    { "type": "string" },
                    { "type": "array", "items": order_by_entry_schema() }
                ]
            },
            "limit": limit_property(sfmcp_soql::MAX_QUERY_LIMIT)
        },
        "required": ["objectName", "fields"],
        "additionalProperties": false
    })
}

fn aggregate_query_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "objectName": object_name_property(),
            "selectFields": {
                "type": "array",
                "description": "Grouped fields and aggregates, e.g. StageName, COUNT(Id) cnt, SUM(Amount)",
                "items": { "type": "string" },
                "minItems": 1
            },
            "groupByFields": {
                "type": "array",
                "description": "Field names, or {field, dateGranularity} to group by a date function",
                "items": {
                    "oneOf": [
                        { "type": "string" },
                        {
                            "type": "object",
                            "properties": {
                                "field": { "type": "string" },
                                "dateGranularity": {
                                    "type": "string",
                                    "enum": ["CALENDAR_YEAR", "CALENDAR_QUARTER", "CALENDAR_MONTH", "FISCAL_YEAR", "FISCAL_QUARTER"]
                                }
                            },
                            "required": ["field"],
                            "additionalProperties": false
                        }
                    ]
                }
            },
            "where": conditions_property(),
            "whereClause": {
                "type": "string",
                "description": "Free-text filter on records (not on aggregates)"
            },
            "havingClause": {
                "type": "string",
                "description": "Filter on aggregated values, e.g. COUNT(Id) > 5"
            },
            "orderBy": {
                "type": "string",
                "description": "Grouped fields or aggregates, e.g. COUNT(Id) DESC"
            },
            "limit": limit_property(sfmcp_soql::MAX_QUERY_LIMIT)
        },
        "required": ["objectName", "selectFields"],
        "additionalProperties": false
    })
}

fn search_all_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "searchTerm": {
                "type": "string",
                "minLength": 1
            },
            "searchIn": {
                "type": "string",
                "enum": ["ALL_FIELDS", "NAME_FIELDS", "EMAIL_FIELDS", "PHONE_FIELDS"],
                "default": "ALL_FIELDS"
            },
            "objects": {
                "type": "array",
                "description": "Objects to return with their fields and optional filters",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "fields": { "type": "array", "items": { "type": "string" } },
                        "where": conditions_property(),
                        "orderBy": { "type": "array", "items": order_by_entry_schema() },
                        "limit": limit_property(MAX_SEARCH_LIMIT)
                    },
                    "required": ["name"],
                    "additionalProperties": false
                }
            },
            "limit": limit_property(MAX_SEARCH_LIMIT)
        },
        "required": ["searchTerm"],
        "additionalProperties": false
    })
}

fn dml_records_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "operation": {
                "type": "string",
                "enum": ["insert", "update", "upsert", "delete"]
            },
            "objectName": object_name_property(),
            "records": {
                "type": "array",
                "description": "Field maps. update and delete need Id; upsert needs the external ID field",
                "items": { "type": "object" },
                "minItems": 1,
                "maxItems": 200
            },
            "externalIdField": {
                "type": "string",
                "description": "External ID field used to match records on upsert"
            }
        },
        "required": ["operation", "objectName", "records"],
        "additionalProperties": false
    })
}
