// ABOUTME: Notification inbox routes
// ABOUTME: Lists broadcast and targeted notifications with per-user read state and marks them read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use mealmate_core::models::UserNotification;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::resources::ServerResources;

/// Inbox listing
#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<UserNotification>,
    pub unread: usize,
}

/// Notification routes handler
pub struct NotificationsRoutes;

impl NotificationsRoutes {
    /// Create all notification routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/notifications", get(Self::handle_list))
            .route("/api/notifications/:id/read", post(Self::handle_mark_read))
            .with_state(resources)
    }

    /// Handle GET /api/notifications
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let notifications = resources
            .database
            .notifications()
            .list_for_user(auth.user_id)
            .await?;

        let response = NotificationsResponse {
            unread: notifications.iter().filter(|n| !n.read).count(),
            notifications,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/notifications/:id/read
    async fn handle_mark_read(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let visible = resources
            .database
            .notifications()
            .mark_read(id, auth.user_id)
            .await?;
        if !visible {
            return Err(AppError::not_found(format!("Notification {id}")));
        }
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
