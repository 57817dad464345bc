use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use server::routes::{self, AppState};
use service::errors::StorageError;
use service::storage::local::LocalTodoCollection;
use service::todos::{NewTodo, ResourceStore, Todo, TodoCollection, TodoFilter, TodoId, TodoPatch, UpdateOutcome};

fn app_with(collection: Arc<dyn TodoCollection>) -> Router {
    let state = AppState { store: ResourceStore::new(collection) };
    routes::build_router(state, CorsLayer::very_permissive())
}

fn app() -> Router {
    app_with(Arc::new(LocalTodoCollection::in_memory()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

/// Collection that is always unreachable.
struct Down;

#[async_trait]
impl TodoCollection for Down {
    async fn find_all(&self) -> Result<Vec<Todo>, StorageError> {
        Err(StorageError::unavailable("find_all", "connection refused"))
    }
    async fn insert_one(&self, _: NewTodo) -> Result<TodoId, StorageError> {
        Err(StorageError::unavailable("insert_one", "connection refused"))
    }
    async fn update_one(&self, _: TodoId, _: TodoPatch) -> Result<UpdateOutcome, StorageError> {
        Err(StorageError::unavailable("update_one", "connection refused"))
    }
    async fn delete_one(&self, _: TodoId) -> Result<u64, StorageError> {
        Err(StorageError::unavailable("delete_one", "connection refused"))
    }
    async fn delete_many(&self, _: TodoFilter) -> Result<u64, StorageError> {
        Err(StorageError::unavailable("delete_many", "connection refused"))
    }
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_returns_created_id() {
    let app = app();
    let (status, body) = send(&app, "POST", "/todos", Some(json!({"title": "Buy milk"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, list) = send(&app, "GET", "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([{"id": id, "title": "Buy milk", "completed": false}]));
}

#[tokio::test]
async fn blank_or_missing_title_is_bad_request() {
    let app = app();
    for body in [json!({"title": ""}), json!({"title": "   "}), json!({}), json!({"title": null}), json!({"title": 5})] {
        let (status, err) = send(&app, "POST", "/todos", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], 1001);
    }
    let (_, list) = send(&app, "GET", "/todos", None).await;
    assert_eq!(list, json!([]));
}

async fn post_raw(app: &Router, content_type: Option<&str>, body: &'static str) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri("/todos");
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    let res = app.clone().oneshot(builder.body(Body::from(body)).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn unusable_create_bodies_are_validation_errors() {
    let app = app();
    let cases = [
        (Some("application/json"), r#"{"title": null}"#),
        (Some("application/json"), r#"{"title": 5}"#),
        (Some("application/json"), r#"{"title": ["a"]}"#),
        (Some("application/json"), r#"{"title": "#),
        (Some("application/json"), ""),
        (None, r#"{"title":"x"}"#),
        (Some("text/plain"), "Buy milk"),
    ];
    for (content_type, body) in cases {
        let (status, err) = post_raw(&app, content_type, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(err["code"], 1001, "body {body:?}");
        assert_eq!(err["error"], "Validation Error");
        assert!(err["message"].is_string());
    }
    let (_, list) = send(&app, "GET", "/todos", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn complete_twice_reports_no_change_the_second_time() {
    let app = app();
    let (_, created) = send(&app, "POST", "/todos", Some(json!({"title": "x"}))).await;
    let uri = format!("/todos/{}", created["id"].as_str().unwrap());

    let (status, first) = send(&app, "PUT", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["changed"], true);
    let (status, second) = send(&app, "PUT", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["changed"], false);
    assert_eq!(second["completed"], true);
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let app = app();
    let unknown = format!("/todos/{}", uuid::Uuid::new_v4());
    for uri in [unknown.as_str(), "/todos/not-an-id"] {
        let (status, body) = send(&app, "PUT", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 1003);
        let (status, _) = send(&app, "DELETE", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn delete_all_returns_count() {
    let app = app();
    for t in ["a", "b"] {
        send(&app, "POST", "/todos", Some(json!({"title": t}))).await;
    }
    let (status, body) = send(&app, "DELETE", "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);
    let (_, body) = send(&app, "DELETE", "/todos", None).await;
    assert_eq!(body["deleted"], 0);
}

#[tokio::test]
async fn storage_outage_is_internal_error() {
    let app = app_with(Arc::new(Down));
    let (status, body) = send(&app, "GET", "/todos", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 1200);
    assert_eq!(body["error"], "Storage Error");
}

#[tokio::test]
async fn openapi_document_lists_todo_routes() {
    let (status, doc) = send(&app(), "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/todos"].is_object());
    assert!(doc["paths"]["/todos/{id}"].is_object());
}
