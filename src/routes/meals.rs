// ABOUTME: Meal log routes and the daily calorie summary
// ABOUTME: Logging a catalogue dish also feeds a log_meal interaction into the taste profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use mealmate_core::models::{validate_logged_calories, LogMealRequest, MealLog};
use mealmate_intelligence::{daily_summary, DailySummary};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::flows::resolve_daily_target;
use crate::resources::ServerResources;

/// Query selecting one UTC calendar day
#[derive(Debug, Deserialize)]
pub struct DayQuery {
    /// Defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Query for the daily summary
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Overrides the profile-derived target
    #[serde(default)]
    pub calorie_target: Option<u32>,
}

/// One day of meal logs
#[derive(Debug, Serialize, Deserialize)]
pub struct DayMealsResponse {
    pub date: NaiveDate,
    pub meals: Vec<MealLog>,
}

/// Daily summary for one date
#[derive(Debug, Serialize)]
pub struct MealSummaryResponse {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub summary: DailySummary,
}

/// Meal log routes handler
pub struct MealsRoutes;

impl MealsRoutes {
    /// Create all meal log routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/meals", post(Self::handle_log).get(Self::handle_list))
            .route("/api/meals/summary", get(Self::handle_summary))
            .route("/api/meals/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle POST /api/meals
    async fn handle_log(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<LogMealRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let now = Utc::now();
        let db = &resources.database;

        let (dish, dish_name, calories) = if let Some(dish_id) = body.dish_id {
            let dish = db
                .dishes()
                .get(dish_id)
                .await?
                .filter(|d| d.is_active)
                .ok_or_else(|| AppError::not_found(format!("Dish {dish_id}")))?;
            let calories = body.calories.unwrap_or(dish.calories);
            validate_logged_calories(calories)?;
            let name = dish.name.clone();
            (Some(dish), name, calories)
        } else {
            let (name, calories) = body.validate_free_text()?;
            (None, name, calories)
        };

        let log = MealLog {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            dish_id: dish.as_ref().map(|d| d.id),
            dish_name,
            meal_type: body.meal_type,
            calories,
            eaten_at: body.eaten_at.unwrap_or(now),
            notes: body
                .notes
                .map(|n| n.trim().to_owned())
                .filter(|n| !n.is_empty()),
        };
        if let Some(dish) = dish {
            let profile = db.meals().create_for_dish(&log, &dish, now).await?;
            debug!(
                user_id = %auth.user_id,
                dish = %dish.name,
                interactions = profile.interactions,
                "Profile updated from meal log"
            );
        } else {
            db.meals().create(&log).await?;
        }

        Ok((StatusCode::CREATED, Json(log)).into_response())
    }

    /// Handle GET /api/meals?date=
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<DayQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

        let meals = resources
            .database
            .meals()
            .list_for_day(auth.user_id, date)
            .await?;

        Ok((StatusCode::OK, Json(DayMealsResponse { date, meals })).into_response())
    }

    /// Handle GET /api/meals/summary?date=
    async fn handle_summary(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<SummaryQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
        let db = &resources.database;

        let user = db
            .users()
            .get(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        let target = resolve_daily_target(
            query.calorie_target,
            user.nutrition.as_ref(),
            resources.config.default_calorie_target,
        )?;

        let logs = db.meals().list_for_day(auth.user_id, date).await?;
        let response = MealSummaryResponse {
            date,
            summary: daily_summary(&logs, target),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/meals/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;

        let deleted = resources.database.meals().delete(auth.user_id, id).await?;
        if !deleted {
            return Err(AppError::not_found(format!("Meal log {id}")));
        }

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
