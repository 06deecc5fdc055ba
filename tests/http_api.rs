//! Admin API Tests
//!
//! Drives the router in-process with `oneshot` over the in-memory backends.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tableforge::database::MemoryDatabase;
use tableforge::http_server::{HttpServer, HttpServerConfig};
use tableforge::metadata::MemoryMetadataStore;
use tableforge::orchestrator::SchemaOrchestrator;

// =============================================================================
// Helper Functions
// =============================================================================

fn app() -> (Router, MemoryDatabase) {
    let db = MemoryDatabase::new();
    let orchestrator = SchemaOrchestrator::new(
        Arc::new(db.clone()),
        Arc::new(MemoryMetadataStore::new()),
    );
    let router = HttpServer::new(HttpServerConfig::default(), orchestrator).router();
    (router, db)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder
                .header("content-type", "application/json")
                .header("x-user-id", "alice");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn widgets() -> Value {
    json!({
        "name": "widgets",
        "displayName": "Widgets",
        "fields": [{"name": "sku", "displayName": "SKU", "dataType": "VARCHAR",
                    "maxLength": 20, "isRequired": true, "isUnique": true, "order": 0}]
    })
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (router, _) = app();
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_get_list_delete() {
    let (router, db) = app();

    let (status, created) = send(&router, Method::POST, "/tables", Some(widgets())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "widgets");
    assert_eq!(created["createdBy"], "alice");
    assert_eq!(created["fields"][0]["dataType"], "VARCHAR");
    assert!(db.has_table("custom_widgets"));

    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = send(&router, Method::GET, &format!("/tables/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);

    let (status, by_name) = send(&router, Method::GET, "/tables/by-name/widgets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_name["id"], created["id"]);

    let (status, list) = send(&router, Method::GET, "/tables", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);

    let (status, _) = send(&router, Method::DELETE, &format!("/tables/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!db.has_table("custom_widgets"));

    let (status, body) = send(&router, Method::GET, &format!("/tables/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "TABLE_NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_is_conflict() {
    let (router, _) = app();
    send(&router, Method::POST, "/tables", Some(widgets())).await;

    let (status, body) = send(&router, Method::POST, "/tables", Some(widgets())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "TABLE_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_invalid_definition_lists_violations() {
    let (router, db) = app();
    let definition = json!({
        "name": "Bad",
        "displayName": "",
        "fields": [{"name": "Code", "displayName": "Code", "dataType": "VARCHAR"}]
    });

    let (status, report) =
        send(&router, Method::POST, "/tables/validate", Some(definition.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["valid"], false);

    let (status, body) = send(&router, Method::POST, "/tables", Some(definition)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_DEFINITION");
    assert_eq!(body["violations"], report["errors"]);
    assert!(body["violations"].as_array().unwrap().len() >= 3);
    assert!(db.executed().is_empty());
}

#[tokio::test]
async fn test_creation_failure_is_server_error() {
    let (router, db) = app();
    db.fail_on("CREATE TRIGGER");

    let (status, body) = send(&router, Method::POST, "/tables", Some(widgets())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "CREATION_FAILED");
    assert!(db.table_names().is_empty());
}

#[tokio::test]
async fn test_add_field_and_orphans() {
    let (router, db) = app();
    let (_, created) = send(&router, Method::POST, "/tables", Some(widgets())).await;
    let id = created["id"].as_str().unwrap().to_string();

    let field = json!({"name": "color", "displayName": "Color", "dataType": "TEXT"});
    let (status, added) =
        send(&router, Method::POST, &format!("/tables/{}/fields", id), Some(field.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["order"], 1);

    let (status, body) =
        send(&router, Method::POST, &format!("/tables/{}/fields", id), Some(field)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "FIELD_ALREADY_EXISTS");

    db.insert_table("custom_stray", &["id"]);
    let (status, orphans) = send(&router, Method::GET, "/tables/orphans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orphans["total"], 1);
    assert_eq!(orphans["orphans"][0]["physicalName"], "custom_stray");
}
