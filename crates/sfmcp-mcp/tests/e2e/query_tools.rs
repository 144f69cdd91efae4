//! Record and aggregate queries through `tools/call`.

use super::common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use sfmcp_core::{McpConfig, QueryConfig};

#[tokio::test]
async fn query_builds_soql_and_strips_attributes() {
    let ctx = TestContext::new();
    let result = ctx
        .call(
            "salesforce_query_records",
            json!({
                "objectName": "Account",
                "fields": ["Id", "Name", "Owner.Name"],
                "where": [
                    {"field": "Industry", "operator": "IN", "value": ["Technology", "Finance"]},
                    {"field": "AnnualRevenue", "operator": ">", "value": 1000000}
                ],
                "orderBy": [{"field": "Name", "direction": "desc"}],
                "limit": 25
            }),
        )
        .await;

    let data = payload(&result);
    assert_eq!(data["totalSize"], 2);
    assert_eq!(data["records"][0], json!({"Id": "001000000000001AAA", "Name": "Acme"}));
    assert_eq!(
        ctx.salesforce.queries(),
        vec![
            "SELECT Id, Name, Owner.Name FROM Account \
             WHERE Industry IN ('Technology', 'Finance') AND AnnualRevenue > 1000000 \
             ORDER BY Name DESC LIMIT 25"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn quote_in_value_stays_inside_the_literal() {
    let ctx = TestContext::new();
    ctx.call(
        "salesforce_query_records",
        json!({
            "objectName": "Contact",
            "fields": ["Id"],
            "where": [{"field": "LastName", "operator": "=", "value": "x' OR Name != '"}],
            "limit": 1
        }),
    )
    .await;

    assert_eq!(
        ctx.salesforce.queries(),
        vec![r"SELECT Id FROM Contact WHERE LastName = 'x\' OR Name != \'' LIMIT 1".to_string()]
    );
}

#[tokio::test]
async fn dry_run_returns_query_without_calling_salesforce() {
    let ctx = TestContext::new();
    let result = ctx
        .call_with(
            "salesforce_query_records",
            json!({"objectName": "Account", "fields": ["Id", "(SELECT Id FROM Contacts)"]}),
            json!({"dryRun": true}),
        )
        .await;

    let data = payload(&result);
    assert_eq!(data["dryRun"], true);
    assert_eq!(data["language"], "soql");
    assert_eq!(data["query"], "SELECT Id, (SELECT Id FROM Contacts) FROM Account LIMIT 200");
    assert!(ctx.salesforce.calls().is_empty());
}

#[tokio::test]
async fn invalid_field_is_reported_and_nothing_runs() {
    let ctx = TestContext::new();
    let result = ctx
        .call(
            "salesforce_query_records",
            json!({"objectName": "Account", "fields": ["Id", "Name FROM User --"]}),
        )
        .await;

    assert_tool_error(&result, "Name FROM User --");
    assert!(ctx.salesforce.calls().is_empty());
}

#[tokio::test]
async fn injection_in_object_name_is_rejected() {
    let ctx = TestContext::new();
    let result = ctx
        .call(
            "salesforce_query_records",
            json!({"objectName": "Account WHERE Id != null", "fields": ["Id"]}),
        )
        .await;

    assert_tool_error(&result, "Account WHERE Id != null");
    assert!(ctx.salesforce.calls().is_empty());
}

#[tokio::test]
async fn schema_violations_are_tool_errors() {
    let ctx = TestContext::new();
    let result = ctx
        .call("salesforce_query_records", json!({"objectName": "Account"}))
        .await;

    assert_tool_error(&result, "fields");
}

#[tokio::test]
async fn configured_limits_and_sort_allow_list() {
    let mut query = QueryConfig {
        default_limit: None,
        max_limit: 100,
        ..QueryConfig::default()
    };
    query
        .orderable_fields
        .insert("Account".to_string(), vec!["Name".to_string(), "CreatedDate DESC".to_string()]);
    let ctx = TestContext::with_config(McpConfig::default(), query);

    let result = ctx
        .call(
            "salesforce_query_records",
            json!({"objectName": "Account", "fields": ["Id"], "limit": 101}),
        )
        .await;
    assert_tool_error(&result, "101");

    let result = ctx
        .call(
            "salesforce_query_records",
            json!({"objectName": "Account", "fields": ["Id"], "orderBy": "CreatedDate ASC"}),
        )
        .await;
    assert_tool_error(&result, "CreatedDate");

    ctx.call(
        "salesforce_query_records",
        json!({"objectName": "Account", "fields": ["Id"], "orderBy": "CreatedDate DESC, Name"}),
    )
    .await;
    assert_eq!(
        ctx.salesforce.queries(),
        vec!["SELECT Id FROM Account ORDER BY CreatedDate DESC, Name ASC".to_string()]
    );
}

#[tokio::test]
async fn aggregate_query_with_date_granularity() {
    let ctx = TestContext::new();
    let result = ctx
        .call_with(
            "salesforce_aggregate_query",
            json!({
                "objectName": "Opportunity",
                "selectFields": ["CALENDAR_YEAR(CloseDate) yr", "StageName", "SUM(Amount) total"],
                "groupByFields": [
                    {"field": "CloseDate", "dateGranularity": "CALENDAR_YEAR"},
                    "StageName"
                ],
                "where": [{"field": "IsClosed", "operator": "=", "value": true}],
                "havingClause": "SUM(Amount) > 10000",
                "orderBy": "SUM(Amount) DESC",
                "limit": 10
            }),
            json!({"dryRun": true}),
        )
        .await;

    assert_eq!(
        payload(&result)["query"],
        "SELECT CALENDAR_YEAR(CloseDate) yr, StageName, SUM(Amount) total FROM Opportunity \
         WHERE IsClosed = TRUE GROUP BY CALENDAR_YEAR(CloseDate), StageName \
         HAVING SUM(Amount) > 10000 ORDER BY SUM(Amount) DESC LIMIT 10"
    );
}

#[tokio::test]
async fn aggregate_missing_group_by_names_the_field() {
    let ctx = TestContext::new();
    let result = ctx
        .call(
            "salesforce_aggregate_query",
            json!({
                "objectName": "Opportunity",
                "selectFields": ["StageName", "OwnerId", "COUNT(Id)"],
                "groupByFields": ["StageName"]
            }),
        )
        .await;

    assert_tool_error(&result, "OwnerId");
    assert!(ctx.salesforce.calls().is_empty());
}

#[tokio::test]
async fn aggregate_in_where_is_rejected() {
    let ctx = TestContext::new();
    let result = ctx
        .call(
            "salesforce_aggregate_query",
            json!({
                "objectName": "Opportunity",
                "selectFields": ["StageName", "COUNT(Id)"],
                "groupByFields": ["StageName"],
                "whereClause": "COUNT(Id) > 5"
            }),
        )
        .await;

    assert_tool_error(&result, "HAVING");
}

#[tokio::test]
async fn aggregate_runs_against_salesforce() {
    let ctx = TestContext::new();
    let result = ctx
        .call(
            "salesforce_aggregate_query",
            json!({"objectName": "Account", "selectFields": ["COUNT(Id) total"]}),
        )
        .await;

    assert_eq!(payload(&result)["returned"], 2);
    assert_eq!(
        ctx.salesforce.queries(),
        vec!["SELECT COUNT(Id) total FROM Account".to_string()]
    );
}
