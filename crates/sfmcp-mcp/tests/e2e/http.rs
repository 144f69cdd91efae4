//! HTTP transport routes.

use super::common::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sfmcp_mcp::http_transport::create_router;
use std::sync::Arc;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_mcp(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint() {
    let app = create_router(Arc::new(TestContext::new().server));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tools"], 6);
}

#[tokio::test]
async fn tools_call_over_http() {
    let app = create_router(Arc::new(TestContext::new().server));

    let response = app
        .oneshot(post_mcp(json!({
            "jsonrpc": "2.0",
            "id": "abc",
            "method": "tools/call",
            "params": {
                "name": "salesforce_query_records",
                "arguments": {"objectName": "Account", "fields": ["Id"]},
                "options": {"dryRun": true}
            }
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], "abc");
    assert_eq!(body["result"]["isError"], false);
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("SELECT Id FROM Account LIMIT 200"));
}

#[tokio::test]
async fn notifications_are_accepted_without_a_body() {
    let app = create_router(Arc::new(TestContext::new().server));

    let response = app
        .oneshot(post_mcp(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = create_router(Arc::new(TestContext::new().server));

    let response = app
        .oneshot(post_mcp(json!({"id": 1})))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}
