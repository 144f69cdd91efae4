//! JSON-RPC method handling.

use super::common::*;
use serde_json::json;
use sfmcp_mcp::JsonRpcRequest;

#[tokio::test]
async fn initialize_reports_server_and_capabilities() {
    let ctx = TestContext::new();
    let response = ctx.request("initialize", Some(json!({"protocolVersion": "2024-11-05"}))).await;

    let result = response.result.unwrap();
    assert_eq!(result["serverInfo"]["name"], "sfmcp");
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert!(result["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn initialized_notification_gets_no_response() {
    let ctx = TestContext::new();
    let notification: JsonRpcRequest = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }))
    .unwrap();

    assert!(ctx.server.handle_request(notification).await.is_none());
}

#[tokio::test]
async fn ping_and_shutdown() {
    let ctx = TestContext::new();
    assert_eq!(ctx.request("ping", None).await.result, Some(json!({})));
    assert!(ctx.request("shutdown", None).await.error.is_none());
}

#[tokio::test]
async fn tools_list_returns_all_six_tools_in_name_order() {
    let ctx = TestContext::new();
    let result = ctx.request("tools/list", None).await.result.unwrap();

    let names: Vec<&str> = result["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "salesforce_aggregate_query",
            "salesforce_describe_object",
            "salesforce_dml_records",
            "salesforce_query_records",
            "salesforce_search_all",
            "salesforce_search_objects",
        ]
    );
    assert!(result["tools"][0]["inputSchema"]["properties"].is_object());
}

#[tokio::test]
async fn unknown_method_is_a_jsonrpc_error() {
    let ctx = TestContext::new();
    let response = ctx.request("resources/list", None).await;
    assert_eq!(response.error.unwrap().code, -32601);
}

#[tokio::test]
async fn wrong_jsonrpc_version_is_rejected() {
    let ctx = TestContext::new();
    let mut request = JsonRpcRequest::new(7, "ping", None);
    request.jsonrpc = "1.0".to_string();

    let response = ctx.server.handle_request(request).await.unwrap();
    assert_eq!(response.error.unwrap().code, -32600);
    assert_eq!(response.id, Some(json!(7)));
}

#[tokio::test]
async fn calling_an_unknown_tool_is_a_jsonrpc_error() {
    let ctx = TestContext::new();
    let response = ctx
        .request("tools/call", Some(json!({"name": "salesforce_run_apex", "arguments": {}})))
        .await;
    let error = response.error.unwrap();
    assert_eq!(error.code, -32602);
    assert!(error.message.contains("salesforce_run_apex"));
}

#[tokio::test]
async fn missing_call_params_is_a_jsonrpc_error() {
    let ctx = TestContext::new();
    let response = ctx.request("tools/call", None).await;
    assert_eq!(response.error.unwrap().code, -32602);
}

#[tokio::test]
async fn read_only_mode_hides_and_refuses_dml() {
    let ctx = TestContext::read_only();

    let result = ctx.request("tools/list", None).await.result.unwrap();
    let tools = result["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 5);
    assert!(tools.iter().all(|t| t["name"] != "salesforce_dml_records"));

    let response = ctx
        .request(
            "tools/call",
            Some(json!({
                "name": "salesforce_dml_records",
                "arguments": {"operation": "delete", "objectName": "Account", "records": [{"Id": "001000000000001AAA"}]}
            })),
        )
        .await;
    assert!(response.error.is_some());
    assert!(ctx.salesforce.calls().is_empty());
}
