// ABOUTME: AI suggestion routes for dishes, single meals, day plans, multi-day plans and fridge recipes
// ABOUTME: Each handler snapshots the caller's context and lets the flow runner pick AI or fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use mealmate_core::models::MealType;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::flows::{resolve_daily_target, UserContext};
use crate::resources::ServerResources;

/// Query for dish recommendations
#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Body for a single-meal suggestion
#[derive(Debug, Deserialize)]
pub struct SingleMealRequest {
    pub meal_type: MealType,
    /// Free-text wishes passed to the model
    #[serde(default)]
    pub preferences: Option<String>,
    #[serde(default)]
    pub calorie_target: Option<u32>,
}

/// Body for a day plan
#[derive(Debug, Default, Deserialize)]
pub struct DayPlanRequest {
    /// Defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub calorie_target: Option<u32>,
}

/// Body for a multi-day plan
#[derive(Debug, Default, Deserialize)]
pub struct MealPlanRequest {
    /// Defaults to today
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub calorie_target: Option<u32>,
}

/// Recommendation routes handler
pub struct RecommendationsRoutes;

impl RecommendationsRoutes {
    /// Create all recommendation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/recommendations/dishes", get(Self::handle_dishes))
            .route("/api/recommendations/meal", post(Self::handle_single_meal))
            .route("/api/recommendations/day", post(Self::handle_day_plan))
            .route("/api/recommendations/plan", post(Self::handle_meal_plan))
            .route("/api/recommendations/recipe", post(Self::handle_recipe))
            .with_state(resources)
    }

    async fn load_context(
        resources: &ServerResources,
        user_id: Uuid,
    ) -> Result<UserContext, AppError> {
        UserContext::load(&resources.database, user_id, Utc::now()).await
    }

    fn daily_target(
        resources: &ServerResources,
        ctx: &UserContext,
        requested: Option<u32>,
    ) -> Result<u32, AppError> {
        resolve_daily_target(
            requested,
            ctx.nutrition.as_ref(),
            resources.config.default_calorie_target,
        )
    }

    /// Handle GET /api/recommendations/dishes?limit=
    async fn handle_dishes(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<RecommendQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let ctx = Self::load_context(&resources, auth.user_id).await?;

        let result = resources
            .flows
            .suggest_recommended_dishes(&ctx, query.limit)
            .await?;
        Ok((StatusCode::OK, Json(result)).into_response())
    }

    /// Handle POST /api/recommendations/meal
    async fn handle_single_meal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<SingleMealRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let ctx = Self::load_context(&resources, auth.user_id).await?;
        let target = Self::daily_target(&resources, &ctx, body.calorie_target)?;

        let mut rng = StdRng::from_entropy();
        let result = resources
            .flows
            .suggest_single_meal(
                &ctx,
                body.meal_type,
                body.preferences.as_deref(),
                target,
                &mut rng,
            )
            .await?;
        Ok((StatusCode::OK, Json(result)).into_response())
    }

    /// Handle POST /api/recommendations/day
    async fn handle_day_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<DayPlanRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let ctx = Self::load_context(&resources, auth.user_id).await?;
        let target = Self::daily_target(&resources, &ctx, body.calorie_target)?;
        let date = body.date.unwrap_or(ctx.today);

        let mut rng = StdRng::from_entropy();
        let result = resources
            .flows
            .suggest_day_plan(&ctx, date, target, &mut rng)
            .await;
        Ok((StatusCode::OK, Json(result)).into_response())
    }

    /// Handle POST /api/recommendations/plan
    async fn handle_meal_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<MealPlanRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let ctx = Self::load_context(&resources, auth.user_id).await?;
        let target = Self::daily_target(&resources, &ctx, body.calorie_target)?;
        let start_date = body.start_date.unwrap_or(ctx.today);

        let mut rng = StdRng::from_entropy();
        let result = resources
            .flows
            .suggest_meal_plan(&ctx, start_date, body.days, target, &mut rng)
            .await?;
        Ok((StatusCode::OK, Json(result)).into_response())
    }

    /// Handle POST /api/recommendations/recipe
    async fn handle_recipe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let ctx = Self::load_context(&resources, auth.user_id).await?;

        let result = resources.flows.suggest_fridge_recipe(&ctx).await?;
        Ok((StatusCode::OK, Json(result)).into_response())
    }
}
