//! `TaskFlowClient` against an in-process axum backend.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
    routing::{get, post, put},
};
use client::{ApiError, TaskFlowApi, TaskFlowClient};
use serde_json::{Value, json};
use shared::{
    filters::{FilterKey, TaskFilters},
    models::{LoginRequest, TaskPatch, TaskStatus},
};

#[derive(Clone, Default)]
struct Backend {
    queries: Arc<Mutex<Vec<Option<String>>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some("Bearer good-token")
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"success": false, "message": "Invalid token"})),
    )
        .into_response()
}

fn user_json() -> Value {
    json!({"id": 1, "name": "Ann", "email": "ann@example.com", "created_at": "2024-01-05 10:00:00"})
}

async fn login(Json(body): Json<Value>) -> axum::response::Response {
    if body["password"] == "secret1" {
        Json(json!({"success": true, "data": {"token": "good-token", "user": user_json()}}))
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn verify(headers: HeaderMap) -> axum::response::Response {
    if authorized(&headers) {
        Json(json!({"success": true, "data": {"user": user_json()}})).into_response()
    } else {
        unauthorized()
    }
}

async fn list_tasks(
    State(backend): State<Backend>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    backend.queries.lock().unwrap().push(query);
    Json(json!({
        "success": true,
        "data": {"tasks": [{
            "id": 3,
            "title": "Write report",
            "status": "in_progress",
            "priority": "high",
            "due_date": "2024-03-01T00:00:00.000Z",
            "category_id": 2,
            "category_name": "Work",
            "category_color": "#3B82F6"
        }]}
    }))
    .into_response()
}

async fn update_task(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    backend.bodies.lock().unwrap().push(body);
    Json(json!({
        "success": true,
        "data": {"id": id, "title": "Write report", "status": "completed", "priority": "high"}
    }))
    .into_response()
}

async fn delete_task(headers: HeaderMap, Path(id): Path<i64>) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id == 404 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Task not found"})),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_categories() -> axum::response::Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({"success": false, "message": "Slow down"})),
    )
        .into_response()
}

async fn dashboard(headers: HeaderMap) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::OK, "<html>not json</html>").into_response()
}

async fn spawn_backend() -> (SocketAddr, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", get(verify))
        .route("/api/tasks", get(list_tasks))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .route("/api/categories", get(list_categories))
        .route("/api/users/dashboard", get(dashboard))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, backend)
}

async fn client_for(addr: SocketAddr) -> TaskFlowClient {
    TaskFlowClient::new(&format!("http://{addr}/api")).unwrap()
}

#[tokio::test]
async fn test_login_returns_envelope() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr).await;

    let response = client
        .login(&LoginRequest {
            email: "ann@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
    assert!(response.success);
    let data = response.data.unwrap();
    assert_eq!(data.token, "good-token");
    assert_eq!(data.user.name, "Ann");
    assert!(data.user.created_at.is_some());
}

#[tokio::test]
async fn test_rejected_login_is_auth_failure_with_message() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr).await;

    let err = client
        .login(&LoginRequest {
            email: "ann@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert!(err.is_auth_failure());
    assert_eq!(err.server_message(), Some("Invalid credentials"));
}

#[tokio::test]
async fn test_verify_uses_given_token() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr).await;

    let verified = client.verify("good-token").await.unwrap();
    assert_eq!(verified.into_data().unwrap().user.id, 1);
    assert!(client.verify("expired").await.unwrap_err().is_auth_failure());
}

#[tokio::test]
async fn test_task_query_carries_only_set_filters() {
    let (addr, backend) = spawn_backend().await;
    let client = client_for(addr).await;
    client.set_token(Some("good-token".to_string()));

    let mut filters = TaskFilters::default();
    filters.set(FilterKey::Status, "completed");
    filters.set(FilterKey::Search, "   ");
    filters.set(FilterKey::CategoryId, " 2 ");

    let response = client.list_tasks(&filters.to_query()).await.unwrap();
    let tasks = response.into_data().unwrap().tasks;
    assert_eq!(tasks[0].status, TaskStatus::InProgress);
    assert_eq!(tasks[0].due_date.unwrap().to_string(), "2024-03-01");

    client.list_tasks(&TaskFilters::default().to_query()).await.unwrap();

    let queries = backend.queries.lock().unwrap().clone();
    assert_eq!(
        queries,
        vec![Some("status=completed&category_id=2".to_string()), None]
    );
}

#[tokio::test]
async fn test_rejected_token_is_auth_failure() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr).await;
    client.set_token(Some("stale-token".to_string()));

    let err = client
        .list_tasks(&TaskFilters::default().to_query())
        .await
        .unwrap_err();
    assert!(err.is_auth_failure());
    assert_eq!(err.server_message(), Some("Invalid token"));
}

#[tokio::test]
async fn test_missing_token_fails_without_request() {
    let (addr, backend) = spawn_backend().await;
    let client = client_for(addr).await;

    let err = client
        .list_tasks(&TaskFilters::default().to_query())
        .await
        .unwrap_err();
    assert!(err.is_auth_failure());
    assert!(backend.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_status_patch_sends_only_status() {
    let (addr, backend) = spawn_backend().await;
    let client = client_for(addr).await;
    client.set_token(Some("good-token".to_string()));

    let response = client
        .update_task(3, &TaskPatch::status(TaskStatus::Completed))
        .await
        .unwrap();
    assert_eq!(response.into_data().unwrap().status, TaskStatus::Completed);
    assert_eq!(
        backend.bodies.lock().unwrap().clone(),
        vec![json!({"status": "completed"})]
    );
}

#[tokio::test]
async fn test_empty_success_body_is_success() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr).await;
    client.set_token(Some("good-token".to_string()));

    let response = client.delete_task(3).await.unwrap();
    assert!(response.success);
    assert_eq!(response.data, None);

    let err = client.delete_task(404).await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    assert_eq!(err.display_message("Failed to delete task"), "Task not found");
}

#[tokio::test]
async fn test_rate_limit_is_distinguished() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr).await;
    client.set_token(Some("good-token".to_string()));

    let err = client.list_categories().await.unwrap_err();
    assert!(err.is_rate_limited());
    assert!(!err.is_auth_failure());
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr).await;
    client.set_token(Some("good-token".to_string()));

    assert!(matches!(
        client.dashboard().await,
        Err(ApiError::Decode(_))
    ));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr).await;
    let err = client
        .login(&LoginRequest {
            email: "ann@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.status(), None);
}
