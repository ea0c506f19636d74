//! HTTP Integration Tests
//!
//! Start the health server on a free port over the in-memory store and query it
//! with a real HTTP client.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{assert_json, check_test_env, test_config, TestContext, TestServer};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_root() {
    let t = TestContext::memory();
    let server = TestServer::start(&t, test_config()).await.expect("Failed to start server");

    let response = server.get("/").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body, serde_json::json!({"message": "Hello, world!"}));
}

#[tokio::test]
async fn test_health_check() {
    let t = TestContext::memory();
    let server = TestServer::start(&t, test_config()).await.expect("Failed to start server");

    let response = server.get("/health").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_ready() {
    let t = TestContext::memory();
    let server = TestServer::start(&t, test_config()).await.expect("Failed to start server");

    let response = server.get("/health/ready").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["gateway"], false);
}

#[tokio::test]
async fn test_static_files_are_served() {
    let dir = std::env::temp_dir().join(format!("muster-static-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("about.txt"), "muster").unwrap();

    let mut config = test_config();
    config.http.static_dir = Some(dir.clone());
    let t = TestContext::memory();
    let server = TestServer::start(&t, config).await.expect("Failed to start server");

    let response = server.get("/about.txt").await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "muster");

    let response = server.get("/missing.txt").await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_health_ready_with_postgres() {
    if !check_test_env() {
        return;
    }

    let t = TestContext::postgres().await.expect("Failed to connect to PostgreSQL");
    let server = TestServer::start(&t, test_config()).await.expect("Failed to start server");

    let response = server.get("/health/ready").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["store"], true);
}
