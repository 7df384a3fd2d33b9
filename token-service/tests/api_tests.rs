mod common;

use chrono::Duration;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

async fn login(app: &TestApp, user_id: &str) -> Value {
    let response = app
        .post("/api/login")
        .json(&json!({ "user_id": user_id }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/health")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;

    let body = login(&app, "user-123").await;

    assert_eq!(body["status_code"], 201);
    assert!(body["data"]["access_token"].is_string());
    assert_eq!(body["data"]["refresh_token"].as_str().unwrap().len(), 43);
    assert!(body["data"]["expires_at"].is_string());
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_login_blank_user_id() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/login")
        .json(&json!({ "user_id": "   " }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_login_missing_user_id() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/login")
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_protected_with_valid_token() {
    let app = TestApp::spawn().await;
    let body = login(&app, "user-123").await;
    let access_token = body["data"]["access_token"].as_str().unwrap();

    let response = app
        .get_authenticated("/api/protected", access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["user_id"], "user-123");
}

#[tokio::test]
async fn test_protected_without_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/protected")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Missing Authorization header");
}

#[tokio::test]
async fn test_protected_with_invalid_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get_authenticated("/api/protected", "not.a.jwt")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Invalid access token");
}

#[tokio::test]
async fn test_protected_with_expired_token() {
    let app = TestApp::spawn_with_ttls(Duration::milliseconds(1), Duration::days(7)).await;
    let body = login(&app, "user-123").await;
    let access_token = body["data"]["access_token"].as_str().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let response = app
        .get_authenticated("/api/protected", access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Access token expired");
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let app = TestApp::spawn().await;
    let body = login(&app, "user-123").await;
    let refresh_token = body["data"]["refresh_token"].as_str().unwrap();

    let response = app
        .post("/api/refresh")
        .json(&json!({ "user_id": "user-123", "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let rotated: Value = response.json().await.expect("Failed to parse response");
    assert_ne!(rotated["data"]["refresh_token"], body["data"]["refresh_token"]);
    assert_ne!(rotated["data"]["access_token"], body["data"]["access_token"]);
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_refresh_failures_share_one_message() {
    let app = TestApp::spawn().await;
    let body = login(&app, "user-123").await;
    let refresh_token = body["data"]["refresh_token"].as_str().unwrap();

    app.post("/api/refresh")
        .json(&json!({ "user_id": "user-123", "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");

    let reused = app
        .post("/api/refresh")
        .json(&json!({ "user_id": "user-123", "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");
    let unknown = app
        .post("/api/refresh")
        .json(&json!({ "user_id": "user-123", "refresh_token": "garbage-token-value" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    let reused: Value = reused.json().await.expect("Failed to parse response");
    let unknown: Value = unknown.json().await.expect("Failed to parse response");
    assert_eq!(reused, unknown);
    assert!(reused["data"]["message"]
        .as_str()
        .unwrap()
        .contains("re-authenticate"));
}
