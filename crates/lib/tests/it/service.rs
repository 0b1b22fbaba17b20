//! Tests for the HTTP boundary.

use reqwest::StatusCode;
use serde_json::{Value, json};

use gatehouse::service::{ErrorResponse, LoginResponse, RegisterResponse};

use crate::helpers::{spawn_service, test_backends};

async fn post(base_url: &str, path: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base_url}{path}"))
        .json(&body)
        .send()
        .await
        .expect("request failed")
}

#[tokio::test]
async fn register_option_a_returns_created_with_session() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority, profiles).await;

    let response = post(
        &base_url,
        "/api/v0/register",
        json!({"username": "Zed", "password": "abcdef"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: RegisterResponse = response.json().await.unwrap();
    assert_eq!(body.user.username, "zed");
    assert_eq!(body.user.email, "zed@gatehouse.invalid");
    assert!(body.session.is_some());
}

#[tokio::test]
async fn register_option_b_returns_created_without_session() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority, profiles).await;

    let response = post(
        &base_url,
        "/api/v0/register",
        json!({"username": "zed", "email": "z@x.com", "password": "abcdef"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: RegisterResponse = response.json().await.unwrap();
    assert_eq!(body.user.email, "z@x.com");
    assert!(body.session.is_none());
    assert!(body.message.contains("verify"));
}

#[tokio::test]
async fn register_maps_errors_onto_statuses() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority, profiles).await;

    // Validation failure: 400.
    let response = post(
        &base_url,
        "/api/v0/register",
        json!({"username": "zed", "password": "abc"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // First registration wins.
    let response = post(
        &base_url,
        "/api/v0/register",
        json!({"username": "zed", "password": "abcdef"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate username: 409.
    let response = post(
        &base_url,
        "/api/v0/register",
        json!({"username": "ZED", "email": "other@x.com", "password": "abcdef"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: ErrorResponse = response.json().await.unwrap();
    assert!(body.error.contains("zed"));
}

#[tokio::test]
async fn login_rejections_are_uniform() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority, profiles).await;

    post(
        &base_url,
        "/api/v0/register",
        json!({"username": "bob", "password": "abcdef"}),
    )
    .await;

    let unknown = post(
        &base_url,
        "/api/v0/login",
        json!({"identifier": "nouser", "password": "x"}),
    )
    .await;
    let wrong = post(
        &base_url,
        "/api/v0/login",
        json!({"identifier": "bob", "password": "wrongpass"}),
    )
    .await;

    // Same status, same body: no account enumeration through the error.
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown_body: ErrorResponse = unknown.json().await.unwrap();
    let wrong_body: ErrorResponse = wrong.json().await.unwrap();
    assert_eq!(unknown_body.error, wrong_body.error);
}

#[tokio::test]
async fn login_succeeds_with_username_or_email() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority, profiles).await;

    post(
        &base_url,
        "/api/v0/register",
        json!({"username": "alice", "password": "abcdef"}),
    )
    .await;

    for identifier in ["alice", "ALICE", "alice@gatehouse.invalid"] {
        let response = post(
            &base_url,
            "/api/v0/login",
            json!({"identifier": identifier, "password": "abcdef"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "via {identifier}");

        let body: LoginResponse = response.json().await.unwrap();
        assert_eq!(body.user.username, "alice");
        assert!(!body.session.access_token.is_empty());
    }
}

#[tokio::test]
async fn verification_gate_is_distinct_from_bad_credentials() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority.clone(), profiles).await;

    let response = post(
        &base_url,
        "/api/v0/register",
        json!({"username": "carol", "email": "carol@x.com", "password": "abcdef"}),
    )
    .await;
    let registered: RegisterResponse = response.json().await.unwrap();

    // Correct credentials, unverified email: 403, not 401.
    let response = post(
        &base_url,
        "/api/v0/login",
        json!({"identifier": "carol", "password": "abcdef"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    authority.confirm_email(&registered.user.id).await.unwrap();

    let response = post(
        &base_url,
        "/api/v0/login",
        json!({"identifier": "carol", "password": "abcdef"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn preflight_and_health() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority, profiles).await;

    // Cross-origin pre-flight is a no-op answered by the CORS layer.
    let response = reqwest::Client::new()
        .request(
            reqwest::Method::OPTIONS,
            format!("{base_url}/api/v0/register"),
        )
        .header("Origin", "http://localhost:8080")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );

    let response = reqwest::Client::new()
        .get(format!("{base_url}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}
