//! Shaping Salesforce responses for tool output.

use serde_json::{json, Map, Value};
use sfmcp_client::{FieldDescribe, ObjectDescribe, QueryResult, SObjectSummary, SaveResult};

/// Remove the `attributes` envelope Salesforce adds to every record,
/// including records nested in relationships and child subqueries.
pub fn strip_attributes(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| key != "attributes")
                .map(|(key, value)| (key, strip_attributes(value)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_attributes).collect()),
        other => other,
    }
}

pub fn query_result(result: QueryResult) -> Value {
    json!({
        "totalSize": result.total_size,
        "done": result.done,
        "returned": result.records.len(),
        "records": strip_attributes(Value::Array(result.records)),
    })
}

/// Group SOSL hits by their object type.
pub fn search_result(records: Vec<Value>) -> Value {
    let mut by_object: Map<String, Value> = Map::new();
    for record in records {
        let object = record
            .pointer("/attributes/type")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        let entry = by_object
            .entry(object)
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = entry {
            items.push(strip_attributes(record));
        }
    }
    json!({ "results": by_object })
}

pub fn object_summaries(objects: &[&SObjectSummary]) -> Value {
    let items: Vec<Value> = objects
        .iter()
        .map(|o| {
            json!({
                "name": o.name,
                "label": o.label,
                "custom": o.custom,
            })
        })
        .collect();
    json!({ "count": items.len(), "objects": items })
}

fn field_summary(field: &FieldDescribe) -> Value {
    let mut summary = json!({
        "name": field.name,
        "label": field.label,
        "type": field.field_type,
        "nillable": field.nillable,
        "custom": field.custom,
        "createable": field.createable,
        "updateable": field.updateable,
    });
    if field.field_type == "string" || field.field_type == "textarea" {
        summary["length"] = json!(field.length);
    }
    if field.external_id {
        summary["externalId"] = json!(true);
    }
    if !field.reference_to.is_empty() {
        summary["referenceTo"] = json!(field.reference_to);
        summary["relationshipName"] = json!(field.relationship_name);
    }
    let active: Vec<&str> = field
        .picklist_values
        .iter()
        .filter(|p| p.active)
        .map(|p| p.value.as_str())
        .collect();
    if !active.is_empty() {
        summary["picklistValues"] = json!(active);
    }
    summary
}

pub fn describe(describe: &ObjectDescribe) -> Value {
    let children: Vec<Value> = describe
        .child_relationships
        .iter()
        .filter_map(|c| {
            c.relationship_name.as_ref().map(|name| {
                json!({
                    "relationshipName": name,
                    "childObject": c.child_sobject,
                    "field": c.field,
                })
            })
        })
        .collect();

    json!({
        "name": describe.name,
        "label": describe.label,
        "custom": describe.custom,
        "queryable": describe.queryable,
        "createable": describe.createable,
        "updateable": describe.updateable,
        "deletable": describe.deletable,
        "fields": describe.fields.iter().map(field_summary).collect::<Vec<_>>(),
        "childRelationships": children,
    })
}

/// Per-record outcome of a DML call.
pub fn save_outcome(index: usize, outcome: Result<SaveResult, String>) -> Value {
    match outcome {
        Ok(result) => {
            let mut value = json!({
                "index": index,
                "success": result.success,
                "id": result.id,
            });
            if let Some(created) = result.created {
                value["created"] = json!(created);
            }
            if !result.errors.is_empty() {
                value["errors"] = json!(
                    result
                        .errors
                        .iter()
                        .map(|e| format!("{}: {}", e.error_code, e.message))
                        .collect::<Vec<_>>()
                );
            }
            value
        }
        Err(message) => json!({
            "index": index,
            "success": false,
            "errors": [message],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_attributes_nested() {
        let record = json!({
            "attributes": {"type": "Account", "url": "/services/data/v62.0/sobjects/Account/001"},
            "Name": "Acme",
            "Owner": {"attributes": {"type": "User"}, "Name": "Ada"},
            "Contacts": {
                "totalSize": 1,
                "records": [{"attributes": {"type": "Contact"}, "LastName": "Lovelace"}]
            }
        });
        assert_eq!(
            strip_attributes(record),
            json!({
                "Name": "Acme",
                "Owner": {"Name": "Ada"},
                "Contacts": {"totalSize": 1, "records": [{"LastName": "Lovelace"}]}
            })
        );
    }

    #[test]
    fn test_search_result_groups_by_type() {
        let grouped = search_result(vec![
            json!({"attributes": {"type": "Account"}, "Id": "001A"}),
            json!({"attributes": {"type": "Contact"}, "Id": "003A"}),
            json!({"attributes": {"type": "Account"}, "Id": "001B"}),
        ]);
        assert_eq!(grouped["results"]["Account"].as_array().unwrap().len(), 2);
        assert_eq!(grouped["results"]["Contact"][0], json!({"Id": "003A"}));
    }

    #[test]
    fn test_save_outcome_error() {
        let value = save_outcome(2, Err("missing Id".to_string()));
        assert_eq!(value, json!({"index": 2, "success": false, "errors": ["missing Id"]}));
    }
}
