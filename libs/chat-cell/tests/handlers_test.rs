use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use assistant_cell::AppState;
use chat_cell::chat_routes;
use shared_config::AppConfig;

async fn test_app(mock_server: &MockServer) -> Router {
    let mut config = AppConfig::default();
    config.calendar_base_url = mock_server.uri();
    config.calendar_api_key = "test-key".to_string();

    chat_routes(Arc::new(AppState::new(config)))
}

async fn mount_open_calendar(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/calendars/primary/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "event_id": "evt-100" })))
        .mount(mock_server)
        .await;
}

async fn post_chat(app: &Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn missing_message_is_a_bad_request() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server).await;

    let (status, body) = post_chat(&app, json!({ "session_id": "s1" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message is required");
}

#[tokio::test]
async fn greeting_turn_returns_the_channel_envelope() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server).await;

    let (status, body) = post_chat(&app, json!({ "message": "hello" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "pharmacy_chat_assistant");
    assert_eq!(body["session_id"], "default");
    assert!(body["response"]
        .as_str()
        .unwrap()
        .contains("CareWell Pharmacy"));
}

#[tokio::test]
async fn session_accumulates_across_turns_and_books() {
    let mock_server = MockServer::start().await;
    mount_open_calendar(&mock_server).await;
    let app = test_app(&mock_server).await;

    post_chat(&app, json!({ "message": "hello", "session_id": "s-book" })).await;
    post_chat(
        &app,
        json!({ "message": "I'd like to book a flu shot", "session_id": "s-book" }),
    )
    .await;
    let (status, body) = post_chat(
        &app,
        json!({
            "message": "My name is Jane Doe, phone 555-123-4567, email jane@x.com, tomorrow at 2pm",
            "session_id": "s-book"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let reply = body["response"].as_str().unwrap();
    assert!(
        reply.contains("Appointment Confirmed") || reply.contains("no longer available"),
        "unexpected reply: {}",
        reply
    );
}

#[tokio::test]
async fn separate_sessions_do_not_share_slots() {
    let mock_server = MockServer::start().await;
    mount_open_calendar(&mock_server).await;
    let app = test_app(&mock_server).await;

    post_chat(&app, json!({ "message": "hello", "session_id": "a" })).await;
    post_chat(
        &app,
        json!({ "message": "My name is Jane Doe, phone 555-123-4567", "session_id": "a" }),
    )
    .await;

    post_chat(&app, json!({ "message": "hello", "session_id": "b" })).await;
    let (_, body) = post_chat(
        &app,
        json!({ "message": "email other@x.com", "session_id": "b" }),
    )
    .await;

    let reply = body["response"].as_str().unwrap();
    assert!(reply.contains("full name"), "session b should still need a name: {}", reply);
}
