//! End-to-end tests for the REST surface, driven through the router
//! without binding a socket.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tasklane_config::AppConfig;
use tasklane_database::initialize_database;
use tasklane_gateway::{create_router, GatewayState};
use tempfile::TempDir;
use tower::ServiceExt;

async fn test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.database.url = format!("sqlite://{}", temp_dir.path().join("api.db").display());
    config.database.max_connections = 1;

    let pool = initialize_database(&config.database).await.unwrap();
    let state = GatewayState::new(pool, &config).unwrap();
    (create_router(Arc::new(state)), temp_dir)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register_and_login(app: &Router) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"email": "tester@example.com", "password": "hunter2hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "tester@example.com", "password": "hunter2hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (app, _dir) = test_app().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let (app, _dir) = test_app().await;

    let (status, _) = send(&app, Method::GET, "/api/todos", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/todos", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (app, _dir) = test_app().await;
    register_and_login(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"email": "Tester@Example.com", "password": "hunter2hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_and_logout_round_trip() {
    let (app, _dir) = test_app().await;
    let token = register_and_login(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "tester@example.com");
    assert!(body["session"]["expires_at"].is_string());

    let (status, _) = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn todo_crud_through_the_api() {
    let (app, _dir) = test_app().await;
    let token = register_and_login(&app).await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/todos",
        Some(&token),
        Some(json!({"title": "write report", "priority": "high"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, Method::GET, "/api/todos", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, completed) = send(
        &app,
        Method::POST,
        &format!("/api/todos/{id}/complete"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");
    assert!(completed["completed_at"].is_string());

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/todos/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/todos/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_clears_description_with_null() {
    let (app, _dir) = test_app().await;
    let token = register_and_login(&app).await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/todos",
        Some(&token),
        Some(json!({"title": "trim hedge", "description": "front garden"})),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/todos/{id}"),
        Some(&token),
        Some(json!({"description": null, "priority": "low"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["description"].is_null());
    assert_eq!(updated["priority"], "low");
}

#[tokio::test]
async fn unknown_status_filter_is_a_bad_request() {
    let (app, _dir) = test_app().await;
    let token = register_and_login(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/todos?status=bogus",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("bogus"));
}

#[tokio::test]
async fn chat_creates_todos_and_records_the_conversation() {
    let (app, _dir) = test_app().await;
    let token = register_and_login(&app).await;

    let (status, reply) = send(
        &app,
        Method::POST,
        "/api/chat",
        Some(&token),
        Some(json!({"message": "add a task to pay rent"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(reply["reply"].as_str().unwrap().contains("pay rent"));
    assert_eq!(reply["actions"][0]["tool"], "add_task");
    let conversation_id = reply["conversation_id"].as_str().unwrap().to_string();

    let (status, todos) = send(&app, Method::GET, "/api/todos", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todos[0]["title"], "pay rent");

    let (status, conversations) =
        send(&app, Method::GET, "/api/conversations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conversations.as_array().unwrap().len(), 1);

    let (status, messages) = send(
        &app,
        Method::GET,
        &format!("/api/conversations/{conversation_id}/messages"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
}

/// Minimal chat-completions endpoint that always plans a tool the
/// registry does not know.
async fn mock_provider_with_unknown_tool() -> String {
    let app = Router::new().route(
        "/chat/completions",
        axum::routing::post(|| async {
            axum::Json(json!({
                "choices": [{
                    "message": {"content": "{\"tool\": \"bogus_tool\", \"arguments\": {}}"}
                }]
            }))
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn unknown_provider_tool_falls_back_to_keyword_routing() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.database.url = format!("sqlite://{}", temp_dir.path().join("api.db").display());
    config.database.max_connections = 1;
    config.assistant.api_key = Some("test-key".to_string());
    config.assistant.base_url = mock_provider_with_unknown_tool().await;

    let pool = initialize_database(&config.database).await.unwrap();
    let state = GatewayState::new(pool, &config).unwrap();
    let app = create_router(Arc::new(state));
    let token = register_and_login(&app).await;

    let (status, reply) = send(
        &app,
        Method::POST,
        "/api/chat",
        Some(&token),
        Some(json!({"message": "add a task to buy milk"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(reply["reply"].as_str().unwrap().contains("buy milk"));
    assert_eq!(reply["actions"][0]["tool"], "add_task");

    let (_, todos) = send(&app, Method::GET, "/api/todos", Some(&token), None).await;
    assert_eq!(todos.as_array().unwrap().len(), 1);
    assert_eq!(todos[0]["title"], "buy milk");
}

#[tokio::test]
async fn users_cannot_see_each_others_todos() {
    let (app, _dir) = test_app().await;
    let token = register_and_login(&app).await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/todos",
        Some(&token),
        Some(json!({"title": "private task"})),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"email": "other@example.com", "password": "hunter2hunter2"})),
    )
    .await;
    let (_, login) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "other@example.com", "password": "hunter2hunter2"})),
    )
    .await;
    let other_token = login["token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/todos/{id}"),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = send(&app, Method::GET, "/api/todos", Some(&other_token), None).await;
    assert!(listed.as_array().unwrap().is_empty());
}
