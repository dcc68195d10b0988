// ABOUTME: Database operations for user accounts
// ABOUTME: Registration insert, lookup by id or email, and nutrition profile updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use mealmate_core::models::{NutritionProfile, User, UserRole};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::rows::{decode_json, decode_timestamp, decode_uuid, encode_timestamp};
use crate::errors::{AppError, AppResult};

const USER_COLUMNS: &str =
    "id, email, password_hash, display_name, role, nutrition, created_at";

/// Account storage
pub struct UsersManager {
    pool: SqlitePool,
}

impl UsersManager {
    /// Create a manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the email is taken, or a database error
    pub async fn create(&self, user: &User) -> AppResult<()> {
        if self.get_by_email(&user.email).await?.is_some() {
            return Err(AppError::already_exists("User with this email"));
        }

        let nutrition_json = user
            .nutrition
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r"
            INSERT INTO users (id, email, password_hash, display_name, role, nutrition, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(user.id.to_string())
        .bind(user.email.trim().to_lowercase())
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(nutrition_json)
        .bind(encode_timestamp(user.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;

        Ok(())
    }

    /// Look up a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Look up a user by email, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Replace (or clear) a user's nutrition profile
    ///
    /// Returns `false` when the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_nutrition(
        &self,
        user_id: Uuid,
        nutrition: Option<&NutritionProfile>,
    ) -> AppResult<bool> {
        let nutrition_json = nutrition.map(serde_json::to_string).transpose()?;

        let result = sqlx::query("UPDATE users SET nutrition = $1 WHERE id = $2")
            .bind(nutrition_json)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update nutrition profile: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.get("id");
    let role: String = row.get("role");
    let nutrition: Option<String> = row.get("nutrition");
    let created_at: String = row.get("created_at");

    Ok(User {
        id: decode_uuid(&id, "users.id")?,
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        display_name: row.get("display_name"),
        role: UserRole::from_str_or_default(&role),
        nutrition: nutrition
            .as_deref()
            .map(|json| decode_json(json, "users.nutrition"))
            .transpose()?,
        created_at: decode_timestamp(&created_at, "users.created_at")?,
    })
}
