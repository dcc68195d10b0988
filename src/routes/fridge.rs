// ABOUTME: Virtual fridge inventory routes
// ABOUTME: CRUD on the caller's own items plus the expiring-soon view
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use mealmate_core::constants::limits::DEFAULT_EXPIRING_DAYS;
use mealmate_core::models::{FridgeItem, FridgeItemDraft, FridgeItemUpdate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::resources::ServerResources;

/// Longest expiry window accepted by the expiring view
const MAX_EXPIRING_DAYS: u32 = 365;

/// Query for the expiring view
#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    #[serde(default)]
    pub days: Option<u32>,
}

/// Fridge listing
#[derive(Debug, Serialize, Deserialize)]
pub struct FridgeResponse {
    pub items: Vec<FridgeItem>,
}

/// Fridge routes handler
pub struct FridgeRoutes;

impl FridgeRoutes {
    /// Create all fridge routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/fridge", get(Self::handle_list).post(Self::handle_add))
            .route("/api/fridge/expiring", get(Self::handle_expiring))
            .route(
                "/api/fridge/:id",
                put(Self::handle_update).delete(Self::handle_remove),
            )
            .with_state(resources)
    }

    /// Handle GET /api/fridge
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let items = resources.database.fridge().list(auth.user_id).await?;
        Ok((StatusCode::OK, Json(FridgeResponse { items })).into_response())
    }

    /// Handle POST /api/fridge
    async fn handle_add(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<FridgeItemDraft>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let item = resources.database.fridge().add(auth.user_id, body).await?;
        Ok((StatusCode::CREATED, Json(item)).into_response())
    }

    /// Handle PUT /api/fridge/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<FridgeItemUpdate>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let item = resources
            .database
            .fridge()
            .update(auth.user_id, id, body)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Fridge item {id}")))?;
        Ok((StatusCode::OK, Json(item)).into_response())
    }

    /// Handle DELETE /api/fridge/:id
    async fn handle_remove(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let removed = resources.database.fridge().remove(auth.user_id, id).await?;
        if !removed {
            return Err(AppError::not_found(format!("Fridge item {id}")));
        }
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle GET /api/fridge/expiring?days=
    async fn handle_expiring(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ExpiringQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let days = query.days.unwrap_or(DEFAULT_EXPIRING_DAYS);
        if days > MAX_EXPIRING_DAYS {
            return Err(AppError::out_of_range(format!(
                "days must be at most {MAX_EXPIRING_DAYS}"
            )));
        }

        let items = resources
            .database
            .fridge()
            .expiring_within(auth.user_id, Utc::now().date_naive(), days)
            .await?;
        Ok((StatusCode::OK, Json(FridgeResponse { items })).into_response())
    }
}
