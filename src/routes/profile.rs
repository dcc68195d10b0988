// ABOUTME: Taste profile and nutrition profile routes
// ABOUTME: Reads the virtual profile, records dish interactions and stores body metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use mealmate_core::models::{InteractionKind, NutritionProfile, VirtualProfile};
use mealmate_intelligence::{daily_calorie_target, top_origins};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::resources::ServerResources;

/// Origins listed in the profile view
const TOP_ORIGINS: usize = 5;

/// Profile view
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: VirtualProfile,
    pub top_origins: Vec<(String, f64)>,
    pub nutrition: Option<NutritionProfile>,
    /// Daily target used by the flows when the request gives none
    pub daily_calorie_target: u32,
}

/// Interaction report
#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    pub dish_id: Uuid,
    /// `view`, `like`, `log_meal` or `dismiss`
    pub kind: String,
}

/// Profile routes handler
pub struct ProfileRoutes;

impl ProfileRoutes {
    /// Create all profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/profile", get(Self::handle_get))
            .route("/api/profile/nutrition", put(Self::handle_update_nutrition))
            .route("/api/profile/interactions", post(Self::handle_interaction))
            .with_state(resources)
    }

    async fn build_response(
        resources: &ServerResources,
        user_id: Uuid,
        profile: VirtualProfile,
    ) -> Result<ProfileResponse, AppError> {
        let user = resources
            .database
            .users()
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        let target = match &user.nutrition {
            Some(nutrition) => daily_calorie_target(nutrition)?,
            None => resources.config.default_calorie_target,
        };

        Ok(ProfileResponse {
            top_origins: top_origins(&profile, TOP_ORIGINS),
            profile,
            nutrition: user.nutrition,
            daily_calorie_target: target,
        })
    }

    /// Handle GET /api/profile
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let profile = resources
            .database
            .profiles()
            .get_or_default(auth.user_id)
            .await?;
        let response = Self::build_response(&resources, auth.user_id, profile).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/profile/nutrition
    async fn handle_update_nutrition(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<NutritionProfile>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        // rejects metrics the energy formula cannot use
        daily_calorie_target(&body)?;

        let updated = resources
            .database
            .users()
            .update_nutrition(auth.user_id, Some(&body))
            .await?;
        if !updated {
            return Err(AppError::not_found("User"));
        }

        let profile = resources
            .database
            .profiles()
            .get_or_default(auth.user_id)
            .await?;
        let response = Self::build_response(&resources, auth.user_id, profile).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/profile/interactions
    async fn handle_interaction(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<InteractionRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let kind = InteractionKind::parse(&body.kind)?;
        let db = &resources.database;

        let dish = db
            .dishes()
            .get(body.dish_id)
            .await?
            .filter(|d| d.is_active)
            .ok_or_else(|| AppError::not_found(format!("Dish {}", body.dish_id)))?;

        let profile = db
            .profiles()
            .record_interaction(auth.user_id, &dish, kind, Utc::now())
            .await?;

        let response = Self::build_response(&resources, auth.user_id, profile).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
