//! RestClient against an in-process mock of the Salesforce REST API.

use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sfmcp_client::{ClientError, RestClient, SalesforceClient};
use sfmcp_core::SalesforceConfig;
use std::collections::HashMap;

const TOKEN: &str = "00Dmock!token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

fn invalid_session() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!([{"message": "Session expired or invalid", "errorCode": "INVALID_SESSION_ID"}])),
    )
        .into_response()
}

async fn token(State(base): State<String>, Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
    let ok = match form.get("grant_type").map(String::as_str) {
        Some("password") => form.get("password").map(String::as_str) == Some("pwTOKEN"),
        Some("client_credentials") => form.get("client_secret").map(String::as_str) == Some("secret"),
        _ => false,
    };
    if ok {
        (StatusCode::OK, Json(json!({"access_token": TOKEN, "instance_url": base}))).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "authentication failure"})),
        )
            .into_response()
    }
}

async fn query(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> axum::response::Response {
    if !authorized(&headers) {
        return invalid_session();
    }
    let q = params.get("q").cloned().unwrap_or_default();
    if q.contains("Bogus__c") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!([{"message": "No such column 'Bogus__c' on entity 'Account'", "errorCode": "INVALID_FIELD"}])),
        )
            .into_response();
    }
    Json(json!({
        "totalSize": 3,
        "done": false,
        "nextRecordsUrl": "/services/data/v62.0/query/01gMOCK-2",
        "records": [{"Id": "001A", "echo": q}, {"Id": "001B"}]
    }))
    .into_response()
}

async fn query_more(headers: HeaderMap, Path(locator): Path<String>) -> axum::response::Response {
    if !authorized(&headers) {
        return invalid_session();
    }
    assert_eq!(locator, "01gMOCK-2");
    Json(json!({"totalSize": 3, "done": true, "records": [{"Id": "001C"}]})).into_response()
}

async fn create(headers: HeaderMap, Path(object): Path<String>, Json(body): Json<Value>) -> axum::response::Response {
    if !authorized(&headers) {
        return invalid_session();
    }
    assert_eq!(object, "Account");
    assert_eq!(body["Name"], "Acme");
    (StatusCode::CREATED, Json(json!({"id": "001NEW", "success": true, "errors": []}))).into_response()
}

async fn update(headers: HeaderMap, Path((_object, _id)): Path<(String, String)>) -> axum::response::Response {
    if !authorized(&headers) {
        return invalid_session();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn spawn_mock() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = Router::new()
        .route("/services/oauth2/token", post(token))
        .route("/services/data/v62.0/query", get(query))
        .route("/services/data/v62.0/query/{locator}", get(query_more))
        .route("/services/data/v62.0/sobjects/{object}", post(create))
        .route("/services/data/v62.0/sobjects/{object}/{id}", patch(update))
        .with_state(base.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

fn config(base: &str, auth: Value) -> SalesforceConfig {
    serde_json::from_value(json!({
        "instance_url": base,
        "instance_url_env": null,
        "login_url": base,
        "auth": auth
    }))
    .unwrap()
}

#[tokio::test]
async fn username_password_login_and_paginated_query() {
    let base = spawn_mock().await;
    let client = RestClient::connect(&config(
        &base,
        json!({
            "method": "username_password",
            "client_id": "cid",
            "client_secret": "csecret",
            "username": "ops@acme.com",
            "password": "pw",
            "security_token": "TOKEN"
        }),
    ))
    .await
    .unwrap();
    assert_eq!(client.session().instance_url(), base);

    let soql = "SELECT Id FROM Account WHERE Name = 'O\\'Brien & Co'";
    let result = client.query(soql).await.unwrap();
    assert!(result.done);
    assert_eq!(result.total_size, 3);
    let ids: Vec<&str> = result.records.iter().filter_map(|r| r["Id"].as_str()).collect();
    assert_eq!(ids, vec!["001A", "001B", "001C"]);
    assert_eq!(result.records[0]["echo"], soql);
}

#[tokio::test]
async fn client_credentials_login() {
    let base = spawn_mock().await;
    let client = RestClient::connect(&config(
        &base,
        json!({"method": "client_credentials", "client_id": "cid", "client_secret": "secret"}),
    ))
    .await
    .unwrap();
    assert_eq!(client.session().access_token(), TOKEN);
}

#[tokio::test]
async fn failed_login_reports_the_reason() {
    let base = spawn_mock().await;
    let err = RestClient::connect(&config(
        &base,
        json!({"method": "client_credentials", "client_id": "cid", "client_secret": "wrong"}),
    ))
    .await
    .unwrap_err();
    match err {
        ClientError::Auth(reason) => assert!(reason.contains("invalid_grant")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn api_errors_carry_code_and_message() {
    let base = spawn_mock().await;
    let client = RestClient::connect(&config(
        &base,
        json!({"method": "access_token", "access_token": TOKEN, "access_token_env": null}),
    ))
    .await
    .unwrap();

    let err = client.query("SELECT Bogus__c FROM Account").await.unwrap_err();
    match err {
        ClientError::Api { status, code, message } => {
            assert_eq!(status, 400);
            assert_eq!(code, "INVALID_FIELD");
            assert!(message.contains("Bogus__c"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn expired_token_is_an_api_error() {
    let base = spawn_mock().await;
    let client = RestClient::connect(&config(
        &base,
        json!({"method": "access_token", "access_token": "stale", "access_token_env": null}),
    ))
    .await
    .unwrap();
    let err = client.query("SELECT Id FROM Account").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn create_and_update() {
    let base = spawn_mock().await;
    let client = RestClient::connect(&config(
        &base,
        json!({"method": "access_token", "access_token": TOKEN, "access_token_env": null}),
    ))
    .await
    .unwrap();

    let mut record = serde_json::Map::new();
    record.insert("Name".to_string(), json!("Acme"));

    let created = client.create("Account", &record).await.unwrap();
    assert!(created.success);
    assert_eq!(created.id.as_deref(), Some("001NEW"));

    let updated = client.update("Account", "001NEW", &record).await.unwrap();
    assert!(updated.success);
    assert_eq!(updated.id.as_deref(), Some("001NEW"));
}
