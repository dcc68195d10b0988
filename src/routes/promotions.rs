// ABOUTME: Live promotion listing for signed-in users
// ABOUTME: Only active promotions whose window contains the current time are returned
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use mealmate_core::models::Promotion;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::resources::ServerResources;

/// Promotion listing
#[derive(Debug, Serialize, Deserialize)]
pub struct PromotionsResponse {
    pub promotions: Vec<Promotion>,
}

/// Promotions routes handler
pub struct PromotionsRoutes;

impl PromotionsRoutes {
    /// Create all promotion routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/promotions", get(Self::handle_list_live))
            .with_state(resources)
    }

    /// Handle GET /api/promotions
    async fn handle_list_live(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        resources.auth.authenticate(&headers)?;
        let promotions = resources
            .database
            .promotions()
            .list_live(Utc::now())
            .await?;
        Ok((StatusCode::OK, Json(PromotionsResponse { promotions })).into_response())
    }
}
