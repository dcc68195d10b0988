// ABOUTME: Database operations for virtual taste profiles
// ABOUTME: Load-or-empty reads and transactional interaction updates of the per-user score maps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{DateTime, Utc};
use mealmate_core::models::{Dish, InteractionKind, VirtualProfile};
use mealmate_intelligence::apply_interaction;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::rows::{decode_json, decode_timestamp, decode_u32, encode_timestamp};
use crate::errors::{AppError, AppResult};

/// Virtual profile storage
pub struct ProfilesManager {
    pool: SqlitePool,
}

impl ProfilesManager {
    /// Create a manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stored profile, or an empty one for users without history
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn get_or_default(&self, user_id: Uuid) -> AppResult<VirtualProfile> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        Ok(load(&mut conn, user_id)
            .await?
            .unwrap_or_else(|| VirtualProfile::empty(user_id, Utc::now())))
    }

    /// Apply one interaction to the stored profile and return the result
    ///
    /// Concurrent calls for the same user are serialized, so none is lost.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails or the row is malformed
    pub async fn record_interaction(
        &self,
        user_id: Uuid,
        dish: &Dish,
        kind: InteractionKind,
        now: DateTime<Utc>,
    ) -> AppResult<VirtualProfile> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let profile = record_in(&mut tx, user_id, dish, kind, now).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
        Ok(profile)
    }
}

/// Read-modify-write of the profile on a connection already inside a transaction
///
/// The placeholder insert runs first so the transaction holds the write lock
/// before the profile is read.
pub(super) async fn record_in(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    dish: &Dish,
    kind: InteractionKind,
    now: DateTime<Utc>,
) -> AppResult<VirtualProfile> {
    sqlx::query(
        r"
        INSERT INTO virtual_profiles (user_id, origin_scores, category_scores, interactions, updated_at)
        VALUES ($1, '{}', '{}', 0, $2)
        ON CONFLICT(user_id) DO NOTHING
        ",
    )
    .bind(user_id.to_string())
    .bind(encode_timestamp(now))
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to claim virtual profile: {e}")))?;

    let mut profile = load(conn, user_id)
        .await?
        .ok_or_else(|| AppError::internal("Virtual profile vanished inside its transaction"))?;
    apply_interaction(&mut profile, dish, kind, now);

    sqlx::query(
        r"
        UPDATE virtual_profiles
        SET origin_scores = $2, category_scores = $3, interactions = $4, updated_at = $5
        WHERE user_id = $1
        ",
    )
    .bind(user_id.to_string())
    .bind(serde_json::to_string(&profile.origin_scores)?)
    .bind(serde_json::to_string(&profile.category_scores)?)
    .bind(i64::from(profile.interactions))
    .bind(encode_timestamp(profile.updated_at))
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to save virtual profile: {e}")))?;

    Ok(profile)
}

async fn load(conn: &mut SqliteConnection, user_id: Uuid) -> AppResult<Option<VirtualProfile>> {
    let row = sqlx::query(
        r"
        SELECT origin_scores, category_scores, interactions, updated_at
        FROM virtual_profiles WHERE user_id = $1
        ",
    )
    .bind(user_id.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to get virtual profile: {e}")))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let origin_scores: String = row.get("origin_scores");
    let category_scores: String = row.get("category_scores");
    let updated_at: String = row.get("updated_at");

    Ok(Some(VirtualProfile {
        user_id,
        origin_scores: decode_json(&origin_scores, "virtual_profiles.origin_scores")?,
        category_scores: decode_json(&category_scores, "virtual_profiles.category_scores")?,
        interactions: decode_u32(row.get("interactions"), "virtual_profiles.interactions")?,
        updated_at: decode_timestamp(&updated_at, "virtual_profiles.updated_at")?,
    }))
}
