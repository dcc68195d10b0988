// ABOUTME: User authentication route handlers for registration and login
// ABOUTME: Issues JWTs and grants the admin role to the configured admin email on registration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! Authentication routes
//!
//! Registration and login are the only endpoints that accept requests without
//! a bearer token.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{Duration, Utc};
use mealmate_core::models::{User, UserRole};
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, validate_email, validate_password, verify_password};
use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token plus the account it belongs to
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: String,
    pub user: User,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/auth/register", post(Self::handle_register))
            .route("/auth/login", post(Self::handle_login))
            .with_state(resources)
    }

    fn issue(resources: &ServerResources, user: User) -> Result<AuthResponse, AppError> {
        let token = resources.auth.generate_token(&user)?;
        let expires_at = Utc::now() + Duration::hours(resources.auth.token_expiry_hours());
        Ok(AuthResponse {
            token,
            expires_at: expires_at.to_rfc3339(),
            user,
        })
    }

    /// Handle POST /auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let email = body.email.trim().to_lowercase();
        validate_email(&email)?;
        validate_password(&body.password)?;

        let users = resources.database.users();
        if users.get_by_email(&email).await?.is_some() {
            AppLogger::log_auth_event(&email, "register", false, Some("email already registered"));
            return Err(AppError::already_exists("User with this email"));
        }

        let password_hash = hash_password(body.password).await?;
        let display_name = body
            .display_name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());
        let mut user = User::new(&email, password_hash, display_name);
        if resources.config.auth.admin_email.as_deref() == Some(email.as_str()) {
            user.role = UserRole::Admin;
        }
        users.create(&user).await?;

        AppLogger::log_auth_event(&email, "register", true, Some(user.role.as_str()));
        let response = Self::issue(&resources, user)?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let email = body.email.trim().to_lowercase();
        let Some(user) = resources.database.users().get_by_email(&email).await? else {
            AppLogger::log_auth_event(&email, "login", false, Some("unknown email"));
            return Err(AppError::auth_invalid("Invalid email or password"));
        };

        if !verify_password(body.password, user.password_hash.clone()).await? {
            AppLogger::log_auth_event(&email, "login", false, Some("wrong password"));
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        AppLogger::log_auth_event(&email, "login", true, None);
        let response = Self::issue(&resources, user)?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
