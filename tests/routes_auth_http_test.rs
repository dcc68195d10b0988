// ABOUTME: HTTP integration tests for registration, login and bearer authentication
// ABOUTME: Exercises the full router with an in-memory database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

#![allow(missing_docs, clippy::unwrap_used)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{TestApp, ADMIN_EMAIL};
use helpers::axum_test::AxumTestRequest;
use mealmate::models::UserRole;
use mealmate::routes::{AuthResponse, LoginRequest, RegisterRequest};
use serde_json::{json, Value};

fn register_body(email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_owned(),
        password: password.to_owned(),
        display_name: Some("  Linh  ".to_owned()),
    }
}

#[tokio::test]
async fn test_register_returns_token_and_user() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::post("/auth/register")
        .json(&register_body("Linh@Example.com", "correct-horse"))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let body: AuthResponse = response.json();
    assert!(!body.token.is_empty());
    assert_eq!(body.user.email, "linh@example.com");
    assert_eq!(body.user.display_name.as_deref(), Some("Linh"));
    assert_eq!(body.user.role, UserRole::User);

    let claims = app.resources.auth.validate_token(&body.token).unwrap();
    assert_eq!(claims.sub, body.user.id.to_string());
}

#[tokio::test]
async fn test_register_never_exposes_password_hash() {
    let app = TestApp::new().await;

    let body: Value = AxumTestRequest::post("/auth/register")
        .json(&register_body("hidden@example.com", "correct-horse"))
        .send(app.router())
        .await
        .json();

    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    let body = register_body("twice@example.com", "correct-horse");

    AxumTestRequest::post("/auth/register")
        .json(&body)
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let error: Value = AxumTestRequest::post("/auth/register")
        .json(&register_body("TWICE@example.com", "another-pass"))
        .send(app.router())
        .await
        .assert_status(StatusCode::CONFLICT)
        .json();
    assert_eq!(error["error"]["code"], "RESOURCE_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_validates_email_and_password() {
    let app = TestApp::new().await;

    let bad_email = AxumTestRequest::post("/auth/register")
        .json(&register_body("not-an-email", "correct-horse"))
        .send(app.router())
        .await;
    assert_eq!(bad_email.status(), 400);

    let short_password = AxumTestRequest::post("/auth/register")
        .json(&register_body("short@example.com", "abc"))
        .send(app.router())
        .await;
    assert_eq!(short_password.status(), 400);
}

#[tokio::test]
async fn test_configured_admin_email_gets_admin_role() {
    let app = TestApp::new().await;

    let body: AuthResponse = AxumTestRequest::post("/auth/register")
        .json(&register_body(&ADMIN_EMAIL.to_uppercase(), "correct-horse"))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(body.user.role, UserRole::Admin);

    AxumTestRequest::get("/admin/dishes")
        .bearer(&body.token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_login_with_correct_and_wrong_password() {
    let app = TestApp::new().await;
    AxumTestRequest::post("/auth/register")
        .json(&register_body("login@example.com", "correct-horse"))
        .send(app.router())
        .await
        .assert_status(StatusCode::CREATED);

    let ok: AuthResponse = AxumTestRequest::post("/auth/login")
        .json(&LoginRequest {
            email: " LOGIN@example.com ".to_owned(),
            password: "correct-horse".to_owned(),
        })
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(ok.user.email, "login@example.com");

    let wrong: Value = AxumTestRequest::post("/auth/login")
        .json(&LoginRequest {
            email: "login@example.com".to_owned(),
            password: "battery-staple".to_owned(),
        })
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json();
    assert_eq!(wrong["error"]["code"], "AUTH_INVALID");
}

#[tokio::test]
async fn test_login_unknown_email_matches_wrong_password() {
    let app = TestApp::new().await;

    let body: Value = AxumTestRequest::post("/auth/login")
        .json(&json!({"email": "ghost@example.com", "password": "whatever-pass"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json();
    assert_eq!(body["error"]["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let app = TestApp::new().await;

    let missing: Value = AxumTestRequest::get("/api/meals")
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json();
    assert_eq!(missing["error"]["code"], "AUTH_REQUIRED");

    let garbage = AxumTestRequest::get("/api/meals")
        .bearer("not.a.token")
        .send(app.router())
        .await;
    assert_eq!(garbage.status(), 401);

    let basic = AxumTestRequest::get("/api/meals")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send(app.router())
        .await;
    assert_eq!(basic.status(), 401);
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let app = TestApp::new().await;
    let (user, _) = app.user().await;
    let foreign = mealmate::auth::AuthManager::new(b"some-other-secret-value-entirely", 24)
        .generate_token(&user)
        .unwrap();

    let response = AxumTestRequest::get("/api/profile")
        .bearer(&foreign)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new().await;

    let generated = AxumTestRequest::get("/health").send(app.router()).await;
    assert!(generated.header("x-request-id").is_some());

    let propagated = AxumTestRequest::get("/health")
        .header("x-request-id", "req-123")
        .send(app.router())
        .await;
    assert_eq!(propagated.header("x-request-id"), Some("req-123"));
}

#[tokio::test]
async fn test_error_envelope_carries_request_id() {
    let app = TestApp::new().await;

    let body: Value = AxumTestRequest::get("/api/dishes")
        .header("x-request-id", "req-401")
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json();
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");
    assert_eq!(body["error"]["request_id"], "req-401");

    let response = AxumTestRequest::get(&format!("/api/dishes/{}", uuid::Uuid::new_v4()))
        .bearer(&app.user().await.1)
        .send(app.router())
        .await;
    assert_eq!(response.status(), 404);
    let generated = response.header("x-request-id").unwrap().to_owned();
    assert!(response.header("content-type").unwrap().starts_with("application/json"));
    let body: Value = response.json();
    assert_eq!(body["error"]["request_id"], generated.as_str());

    let ok: Value = AxumTestRequest::get("/health")
        .header("x-request-id", "req-200")
        .send(app.router())
        .await
        .json();
    assert!(ok.get("error").is_none());
}
