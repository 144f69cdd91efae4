//! Object discovery, describe and SOSL search.

use super::common::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn search_objects_matches_name_or_label_case_insensitively() {
    let ctx = TestContext::new();
    let result = ctx
        .call("salesforce_search_objects", json!({"searchPattern": "ACCOUNT"}))
        .await;

    let data = payload(&result);
    assert_eq!(data["count"], 2);
    assert_eq!(data["objects"][0]["name"], "Account");
    assert_eq!(data["objects"][1]["name"], "AccountContactRelation");

    let data = payload(
        &ctx.call("salesforce_search_objects", json!({"searchPattern": "invoice"}))
            .await,
    );
    assert_eq!(data["objects"][0], json!({"name": "Invoice__c", "label": "Invoice", "custom": true}));
}

#[tokio::test]
async fn describe_object_summarizes_fields() {
    let ctx = TestContext::new();
    let data = payload(
        &ctx.call("salesforce_describe_object", json!({"objectName": "Account"}))
            .await,
    );

    assert_eq!(data["name"], "Account");
    let fields = data["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[2]["picklistValues"], json!(["Technology"]));
}

#[tokio::test]
async fn describe_object_validates_the_name_before_calling() {
    let ctx = TestContext::new();
    let result = ctx
        .call("salesforce_describe_object", json!({"objectName": "../limits"}))
        .await;

    assert_tool_error(&result, "../limits");
    assert!(ctx.salesforce.calls().is_empty());
}

#[tokio::test]
async fn salesforce_errors_are_tool_errors() {
    let ctx = TestContext::new();
    let result = ctx
        .call("salesforce_describe_object", json!({"objectName": "Widget__c"}))
        .await;

    assert_tool_error(&result, "NOT_FOUND");
}

#[tokio::test]
async fn search_all_groups_results_by_object() {
    let ctx = TestContext::new();
    let data = payload(
        &ctx.call(
            "salesforce_search_all",
            json!({
                "searchTerm": "Acme & Co",
                "searchIn": "NAME_FIELDS",
                "objects": [
                    {"name": "Account", "fields": ["Id", "Name"], "limit": 5},
                    {"name": "Contact", "fields": ["Id", "Name"], "where": [{"field": "Email", "operator": "!=", "value": null}]}
                ]
            }),
        )
        .await,
    );

    assert_eq!(data["results"]["Account"][0]["Name"], "Acme");
    assert_eq!(data["results"]["Contact"][0]["Name"], "Ada Acme");
    assert_eq!(
        ctx.salesforce.queries(),
        vec![
            r"FIND {Acme \& Co} IN NAME FIELDS RETURNING Account(Id, Name LIMIT 5), Contact(Id, Name WHERE Email != NULL)"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn search_all_dry_run() {
    let ctx = TestContext::new();
    let data = payload(
        &ctx.call_with(
            "salesforce_search_all",
            json!({"searchTerm": "acm*", "limit": 50}),
            json!({"dryRun": true}),
        )
        .await,
    );

    assert_eq!(data["language"], "sosl");
    assert_eq!(data["query"], "FIND {acm*} IN ALL FIELDS LIMIT 50");
    assert!(ctx.salesforce.calls().is_empty());
}

#[tokio::test]
async fn search_term_cannot_escape_the_braces() {
    let ctx = TestContext::new();
    let data = payload(
        &ctx.call_with(
            "salesforce_search_all",
            json!({"searchTerm": "x} RETURNING User(Id) FIND {y"}),
            json!({"dryRun": true}),
        )
        .await,
    );

    assert_eq!(data["query"], r"FIND {x\} RETURNING User\(Id\) FIND \{y} IN ALL FIELDS");
}

#[tokio::test]
async fn dry_run_is_refused_for_describe() {
    let ctx = TestContext::new();
    let result = ctx
        .call_with(
            "salesforce_describe_object",
            json!({"objectName": "Account"}),
            json!({"dryRun": true}),
        )
        .await;

    assert_tool_error(&result, "dryRun");
    assert!(ctx.salesforce.calls().is_empty());
}
