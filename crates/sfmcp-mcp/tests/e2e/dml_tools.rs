//! Insert, update, upsert and delete through `salesforce_dml_records`.

use super::common::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn insert_reports_each_record() {
    let ctx = TestContext::new();
    let data = payload(
        &ctx.call(
            "salesforce_dml_records",
            json!({
                "operation": "insert",
                "objectName": "Account",
                "records": [{"Name": "Acme"}, {"Name": ""}]
            }),
        )
        .await,
    );

    assert_eq!(data["total"], 2);
    assert_eq!(data["succeeded"], 1);
    assert_eq!(data["failed"], 1);
    assert_eq!(data["results"][0]["id"], "001000000000NEWAAA");
    let error = data["results"][1]["errors"][0].as_str().unwrap();
    assert!(error.contains("REQUIRED_FIELD_MISSING"));
    assert_eq!(ctx.salesforce.calls().len(), 2);
}

#[tokio::test]
async fn update_sends_fields_without_the_id() {
    let ctx = TestContext::new();
    ctx.call(
        "salesforce_dml_records",
        json!({
            "operation": "update",
            "objectName": "Account",
            "records": [{"Id": "001000000000001AAA", "Industry": "Technology"}]
        }),
    )
    .await;

    let mut expected = serde_json::Map::new();
    expected.insert("Industry".to_string(), json!("Technology"));
    assert_eq!(
        ctx.salesforce.calls(),
        vec![Call::Update(
            "Account".to_string(),
            "001000000000001AAA".to_string(),
            expected
        )]
    );
}

#[tokio::test]
async fn upsert_uses_the_external_id() {
    let ctx = TestContext::new();
    let data = payload(
        &ctx.call(
            "salesforce_dml_records",
            json!({
                "operation": "upsert",
                "objectName": "Account",
                "externalIdField": "Erp_Id__c",
                "records": [{"Erp_Id__c": "ERP-1", "Name": "Acme"}]
            }),
        )
        .await,
    );

    assert_eq!(data["results"][0]["created"], true);
    match &ctx.salesforce.calls()[0] {
        Call::Upsert(object, field, value, body) => {
            assert_eq!(object, "Account");
            assert_eq!(field, "Erp_Id__c");
            assert_eq!(value, "ERP-1");
            assert!(!body.contains_key("Erp_Id__c"));
        }
        other => panic!("unexpected call: {other:?}"),
    }
}

#[tokio::test]
async fn upsert_without_external_id_field_is_rejected() {
    let ctx = TestContext::new();
    let result = ctx
        .call(
            "salesforce_dml_records",
            json!({"operation": "upsert", "objectName": "Account", "records": [{"Name": "Acme"}]}),
        )
        .await;

    assert_tool_error(&result, "externalIdField");
    assert!(ctx.salesforce.calls().is_empty());
}

#[tokio::test]
async fn one_bad_record_stops_the_whole_batch_before_any_call() {
    let ctx = TestContext::new();
    let result = ctx
        .call(
            "salesforce_dml_records",
            json!({
                "operation": "delete",
                "objectName": "Account",
                "records": [{"Id": "001000000000001AAA"}, {"Id": "001' OR Id != '"}]
            }),
        )
        .await;

    assert_tool_error(&result, "not a record ID");
    assert!(ctx.salesforce.calls().is_empty());
}

#[tokio::test]
async fn invalid_field_key_is_rejected() {
    let ctx = TestContext::new();
    let result = ctx
        .call(
            "salesforce_dml_records",
            json!({
                "operation": "insert",
                "objectName": "Contact",
                "records": [{"LastName": "Lovelace", "Account.Name": "Acme"}]
            }),
        )
        .await;

    assert_tool_error(&result, "Account.Name");
    assert!(ctx.salesforce.calls().is_empty());
}

#[tokio::test]
async fn unknown_operation_fails_schema_validation() {
    let ctx = TestContext::new();
    let result = ctx
        .call(
            "salesforce_dml_records",
            json!({"operation": "merge", "objectName": "Account", "records": [{"Name": "A"}]}),
        )
        .await;

    assert_tool_error(&result, "operation");
}
