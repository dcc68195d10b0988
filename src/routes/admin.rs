// ABOUTME: Admin content management routes for dishes, promotions and notifications
// ABOUTME: Every handler requires the admin role and records the change with AppLogger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! Admin API
//!
//! Admins curate the dish catalogue, schedule promotions and send
//! notifications. Deleting a dish removes it from the catalogue; meal logs
//! keep their copied name and calories.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use mealmate_core::models::{
    DishDraft, DishUpdate, Notification, NotificationDraft, PromotionDraft,
};
use serde::Serialize;
use uuid::Uuid;

use crate::database::DishFilter;
use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::routes::dishes::DishListResponse;
use crate::routes::promotions::PromotionsResponse;

/// All notifications, regardless of target
#[derive(Debug, Serialize)]
pub struct AdminNotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// Admin routes handler
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Self::dish_routes()
            .merge(Self::promotion_routes())
            .merge(Self::notification_routes())
            .with_state(resources)
    }

    fn dish_routes() -> Router<Arc<ServerResources>> {
        Router::new()
            .route(
                "/admin/dishes",
                get(Self::handle_list_dishes).post(Self::handle_create_dish),
            )
            .route(
                "/admin/dishes/:id",
                put(Self::handle_update_dish).delete(Self::handle_delete_dish),
            )
    }

    fn promotion_routes() -> Router<Arc<ServerResources>> {
        Router::new()
            .route(
                "/admin/promotions",
                get(Self::handle_list_promotions).post(Self::handle_create_promotion),
            )
            .route(
                "/admin/promotions/:id",
                put(Self::handle_update_promotion).delete(Self::handle_delete_promotion),
            )
    }

    fn notification_routes() -> Router<Arc<ServerResources>> {
        Router::new()
            .route(
                "/admin/notifications",
                get(Self::handle_list_notifications).post(Self::handle_create_notification),
            )
            .route(
                "/admin/notifications/:id",
                delete(Self::handle_delete_notification),
            )
    }

    /// Reject promotions pointing at a dish that does not exist
    async fn check_promoted_dish(
        resources: &ServerResources,
        draft: &PromotionDraft,
    ) -> Result<(), AppError> {
        if let Some(dish_id) = draft.dish_id {
            if resources.database.dishes().get(dish_id).await?.is_none() {
                return Err(AppError::invalid_input(format!(
                    "Promoted dish {dish_id} does not exist"
                )));
            }
        }
        Ok(())
    }

    // ================================================================
    // Dishes
    // ================================================================

    /// Handle GET /admin/dishes
    async fn handle_list_dishes(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(mut filter): Query<DishFilter>,
    ) -> Result<Response, AppError> {
        resources.auth.require_admin(&headers)?;

        filter.include_inactive = true;
        let dishes = resources.database.dishes().list(&filter).await?;
        let response = DishListResponse {
            total: dishes.len(),
            dishes,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /admin/dishes
    async fn handle_create_dish(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<DishDraft>,
    ) -> Result<Response, AppError> {
        let admin = resources.auth.require_admin(&headers)?;

        let dish = resources.database.dishes().create(body).await?;
        AppLogger::log_admin_action(&admin.email, "create", "dish", &dish.id.to_string());
        Ok((StatusCode::CREATED, Json(dish)).into_response())
    }

    /// Handle PUT /admin/dishes/:id
    async fn handle_update_dish(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<DishUpdate>,
    ) -> Result<Response, AppError> {
        let admin = resources.auth.require_admin(&headers)?;

        let dish = resources
            .database
            .dishes()
            .update(id, body)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Dish {id}")))?;
        AppLogger::log_admin_action(&admin.email, "update", "dish", &id.to_string());
        Ok((StatusCode::OK, Json(dish)).into_response())
    }

    /// Handle DELETE /admin/dishes/:id
    async fn handle_delete_dish(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let admin = resources.auth.require_admin(&headers)?;

        if !resources.database.dishes().delete(id).await? {
            return Err(AppError::not_found(format!("Dish {id}")));
        }
        AppLogger::log_admin_action(&admin.email, "delete", "dish", &id.to_string());
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    // ================================================================
    // Promotions
    // ================================================================

    /// Handle GET /admin/promotions
    async fn handle_list_promotions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        resources.auth.require_admin(&headers)?;

        let promotions = resources.database.promotions().list().await?;
        Ok((StatusCode::OK, Json(PromotionsResponse { promotions })).into_response())
    }

    /// Handle POST /admin/promotions
    async fn handle_create_promotion(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<PromotionDraft>,
    ) -> Result<Response, AppError> {
        let admin = resources.auth.require_admin(&headers)?;
        Self::check_promoted_dish(&resources, &body).await?;

        let promotion = resources.database.promotions().create(body).await?;
        AppLogger::log_admin_action(
            &admin.email,
            "create",
            "promotion",
            &promotion.id.to_string(),
        );
        Ok((StatusCode::CREATED, Json(promotion)).into_response())
    }

    /// Handle PUT /admin/promotions/:id
    async fn handle_update_promotion(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<PromotionDraft>,
    ) -> Result<Response, AppError> {
        let admin = resources.auth.require_admin(&headers)?;
        Self::check_promoted_dish(&resources, &body).await?;

        let promotion = resources
            .database
            .promotions()
            .update(id, body)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Promotion {id}")))?;
        AppLogger::log_admin_action(&admin.email, "update", "promotion", &id.to_string());
        Ok((StatusCode::OK, Json(promotion)).into_response())
    }

    /// Handle DELETE /admin/promotions/:id
    async fn handle_delete_promotion(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let admin = resources.auth.require_admin(&headers)?;

        if !resources.database.promotions().delete(id).await? {
            return Err(AppError::not_found(format!("Promotion {id}")));
        }
        AppLogger::log_admin_action(&admin.email, "delete", "promotion", &id.to_string());
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    // ================================================================
    // Notifications
    // ================================================================

    /// Handle GET /admin/notifications
    async fn handle_list_notifications(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        resources.auth.require_admin(&headers)?;

        let notifications = resources.database.notifications().list_all().await?;
        Ok((StatusCode::OK, Json(AdminNotificationsResponse { notifications })).into_response())
    }

    /// Handle POST /admin/notifications
    async fn handle_create_notification(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<NotificationDraft>,
    ) -> Result<Response, AppError> {
        let admin = resources.auth.require_admin(&headers)?;

        if let Some(user_id) = body.user_id {
            if resources.database.users().get(user_id).await?.is_none() {
                return Err(AppError::invalid_input(format!(
                    "Target user {user_id} does not exist"
                )));
            }
        }

        let notification = resources.database.notifications().create(body).await?;
        AppLogger::log_admin_action(
            &admin.email,
            "create",
            "notification",
            &notification.id.to_string(),
        );
        Ok((StatusCode::CREATED, Json(notification)).into_response())
    }

    /// Handle DELETE /admin/notifications/:id
    async fn handle_delete_notification(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let admin = resources.auth.require_admin(&headers)?;

        if !resources.database.notifications().delete(id).await? {
            return Err(AppError::not_found(format!("Notification {id}")));
        }
        AppLogger::log_admin_action(&admin.email, "delete", "notification", &id.to_string());
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
