// ABOUTME: HTTP integration tests for the AI suggestion routes
// ABOUTME: Drives the flows through the router with a scripted provider and with no provider at all
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

#![allow(missing_docs, clippy::unwrap_used)]

mod common;
mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use common::TestApp;
use helpers::axum_test::AxumTestRequest;
use helpers::mock_llm::MockLlmProvider;
use mealmate::llm::LlmProvider;
use serde_json::{json, Value};

async fn app_with(mock: &Arc<MockLlmProvider>) -> TestApp {
    let provider: Arc<dyn LlmProvider> = mock.clone();
    TestApp::with_provider(Some(provider)).await
}

#[tokio::test]
async fn test_recommended_dishes_come_from_the_model() {
    let mock = MockLlmProvider::with_json(&[json!({
        "recommendations": [{"name": "Pho Bo", "reason": "Warm and light"}]
    })]);
    let app = app_with(&mock).await;
    let (_, token) = app.user().await;

    let body: Value = AxumTestRequest::get("/api/recommendations/dishes?limit=3")
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["source"], "ai");
    assert_eq!(body["attempts"], 1);
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 3);
    assert_eq!(recommendations[0]["dish"]["name"], "Pho Bo");
    assert_eq!(recommendations[0]["reason"], "Warm and light");
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_recommended_dishes_limit_is_bounded() {
    let app = TestApp::new().await;
    let (_, token) = app.user().await;

    for limit in [0, 21] {
        let body: Value = AxumTestRequest::get(&format!("/api/recommendations/dishes?limit={limit}"))
            .bearer(&token)
            .send(app.router())
            .await
            .assert_status(StatusCode::BAD_REQUEST)
            .json();
        assert_eq!(body["error"]["code"], "VALUE_OUT_OF_RANGE");
    }
}

#[tokio::test]
async fn test_recommendations_without_provider_use_heuristics() {
    let app = TestApp::new().await;
    let (_, token) = app.user().await;

    let body: Value = AxumTestRequest::get("/api/recommendations/dishes")
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["source"], "fallback");
    assert_eq!(body["attempts"], 0);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_single_meal_is_checked_against_its_slot() {
    let mock = MockLlmProvider::with_json(&[
        json!({"name": "Bun Cha", "reason": "Hearty"}),
        json!({"name": "Shakshuka", "reason": "Eggs in the morning"}),
    ]);
    let app = app_with(&mock).await;
    let (_, token) = app.user().await;

    let body: Value = AxumTestRequest::post("/api/recommendations/meal")
        .bearer(&token)
        .json(&json!({"meal_type": "breakfast", "preferences": "something savoury"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["source"], "ai");
    assert_eq!(body["attempts"], 2);
    assert_eq!(body["meal_type"], "breakfast");
    assert_eq!(body["calorie_target"], 500);
    assert_eq!(body["dish"]["name"], "Shakshuka");
}

#[tokio::test]
async fn test_single_meal_rejects_unknown_slot() {
    let app = TestApp::new().await;
    let (_, token) = app.user().await;

    let response = AxumTestRequest::post("/api/recommendations/meal")
        .bearer(&token)
        .json(&json!({"meal_type": "brunch"}))
        .send(app.router())
        .await;
    assert!(response.status() >= 400 && response.status() < 500);
}

#[tokio::test]
async fn test_day_plan_falls_back_offline() {
    let app = TestApp::new().await;
    let (_, token) = app.user().await;

    let body: Value = AxumTestRequest::post("/api/recommendations/day")
        .bearer(&token)
        .json(&json!({"date": "2025-05-05"}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["source"], "fallback");
    assert_eq!(body["attempts"], 0);
    assert_eq!(body["calorie_target"], 2000);
    assert_eq!(body["plan"]["date"], "2025-05-05");
    assert!(!body["plan"]["meals"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_meal_plan_covers_requested_days() {
    let app = TestApp::new().await;
    let (_, token) = app.user().await;

    let body: Value = AxumTestRequest::post("/api/recommendations/plan")
        .bearer(&token)
        .json(&json!({"start_date": "2025-05-05", "days": 2, "calorie_target": 1800}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["source"], "fallback");
    assert_eq!(body["calorie_target"], 1800);
    let days = body["plan"]["days"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2025-05-05");
    assert_eq!(days[1]["date"], "2025-05-06");

    AxumTestRequest::post("/api/recommendations/plan")
        .bearer(&token)
        .json(&json!({"days": 15}))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_meal_plan_rejects_start_past_last_date() {
    let app = TestApp::new().await;
    let (_, token) = app.user().await;

    let body: Value = AxumTestRequest::post("/api/recommendations/plan")
        .bearer(&token)
        .json(&json!({"start_date": "+262142-12-31", "days": 2}))
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(body["error"]["code"], "VALUE_OUT_OF_RANGE");

    let body: Value = AxumTestRequest::post("/api/recommendations/plan")
        .bearer(&token)
        .json(&json!({"start_date": "+262142-12-31", "days": 1}))
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["plan"]["days"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_recipe_needs_fridge_contents() {
    let app = TestApp::new().await;
    let (_, token) = app.user().await;

    let empty: Value = AxumTestRequest::post("/api/recommendations/recipe")
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(empty["error"]["code"], "INVALID_INPUT");

    for name in ["Feta", "Cucumber"] {
        AxumTestRequest::post("/api/fridge")
            .bearer(&token)
            .json(&json!({"name": name, "quantity": 1.0}))
            .send(app.router())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let body: Value = AxumTestRequest::post("/api/recommendations/recipe")
        .bearer(&token)
        .send(app.router())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["title"], "Greek Salad");
    assert_eq!(body["estimated_calories"], 350);
}

#[tokio::test]
async fn test_recommendation_routes_require_auth() {
    let app = TestApp::new().await;

    AxumTestRequest::post("/api/recommendations/day")
        .json(&json!({}))
        .send(app.router())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
