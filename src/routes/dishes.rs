// ABOUTME: Catalogue browsing routes for signed-in users
// ABOUTME: Lists and fetches active dishes with category, origin and name filters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use mealmate_core::models::Dish;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::DishFilter;
use crate::errors::AppError;
use crate::resources::ServerResources;

/// Response for dish listings
#[derive(Debug, Serialize, Deserialize)]
pub struct DishListResponse {
    pub dishes: Vec<Dish>,
    pub total: usize,
}

/// Dish catalogue routes handler
pub struct DishesRoutes;

impl DishesRoutes {
    /// Create all catalogue routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/dishes", get(Self::handle_list))
            .route("/api/dishes/:id", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/dishes
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(mut filter): Query<DishFilter>,
    ) -> Result<Response, AppError> {
        resources.auth.authenticate(&headers)?;

        filter.include_inactive = false;
        let dishes = resources.database.dishes().list(&filter).await?;

        let response = DishListResponse {
            total: dishes.len(),
            dishes,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/dishes/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        resources.auth.authenticate(&headers)?;

        let dish = resources
            .database
            .dishes()
            .get(id)
            .await?
            .filter(|d| d.is_active)
            .ok_or_else(|| AppError::not_found(format!("Dish {id}")))?;

        Ok((StatusCode::OK, Json(dish)).into_response())
    }
}
