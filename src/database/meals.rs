// ABOUTME: Database operations for meal logs scoped to their owner
// ABOUTME: Insert, per-day and since-time listing, and owner-checked deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{DateTime, Days, NaiveDate, Utc};
use mealmate_core::models::{Dish, InteractionKind, MealLog, MealType, VirtualProfile};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::profiles;
use super::rows::{decode_timestamp, decode_u32, decode_uuid, encode_timestamp};
use crate::errors::{AppError, AppResult};

const MEAL_COLUMNS: &str = "id, user_id, dish_id, dish_name, meal_type, calories, eaten_at, notes";

/// Meal log storage
pub struct MealLogManager {
    pool: SqlitePool,
}

impl MealLogManager {
    /// Create a manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a log entry
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create(&self, log: &MealLog) -> AppResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        insert(&mut conn, log).await
    }

    /// Insert a catalogue-dish log and apply its `log_meal` interaction in one transaction
    ///
    /// Either both the log and the profile update are stored or neither is.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement or the commit fails
    pub async fn create_for_dish(
        &self,
        log: &MealLog,
        dish: &Dish,
        now: DateTime<Utc>,
    ) -> AppResult<VirtualProfile> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        insert(&mut tx, log).await?;
        let profile =
            profiles::record_in(&mut tx, log.user_id, dish, InteractionKind::LogMeal, now).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
        Ok(profile)
    }

    /// Entries eaten on `date` (UTC day), oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list_for_day(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Vec<MealLog>> {
        let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::out_of_range("Date is out of range"))?
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();

        let rows = sqlx::query(&format!(
            "SELECT {MEAL_COLUMNS} FROM meal_logs \
             WHERE user_id = $1 AND eaten_at >= $2 AND eaten_at < $3 \
             ORDER BY eaten_at ASC"
        ))
        .bind(user_id.to_string())
        .bind(encode_timestamp(start))
        .bind(encode_timestamp(end))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list meals: {e}")))?;

        rows.iter().map(row_to_meal_log).collect()
    }

    /// Entries eaten at or after `since`, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list_since(&self, user_id: Uuid, since: DateTime<Utc>) -> AppResult<Vec<MealLog>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEAL_COLUMNS} FROM meal_logs \
             WHERE user_id = $1 AND eaten_at >= $2 \
             ORDER BY eaten_at DESC"
        ))
        .bind(user_id.to_string())
        .bind(encode_timestamp(since))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list recent meals: {e}")))?;

        rows.iter().map(row_to_meal_log).collect()
    }

    /// Delete one of the user's entries; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, user_id: Uuid, log_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM meal_logs WHERE id = $1 AND user_id = $2")
            .bind(log_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete meal log: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

async fn insert(conn: &mut SqliteConnection, log: &MealLog) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO meal_logs (id, user_id, dish_id, dish_name, meal_type, calories, eaten_at, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ",
    )
    .bind(log.id.to_string())
    .bind(log.user_id.to_string())
    .bind(log.dish_id.map(|id| id.to_string()))
    .bind(&log.dish_name)
    .bind(log.meal_type.as_str())
    .bind(i64::from(log.calories))
    .bind(encode_timestamp(log.eaten_at))
    .bind(&log.notes)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to log meal: {e}")))?;

    Ok(())
}

fn row_to_meal_log(row: &SqliteRow) -> AppResult<MealLog> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let dish_id: Option<String> = row.get("dish_id");
    let meal_type: String = row.get("meal_type");
    let eaten_at: String = row.get("eaten_at");

    Ok(MealLog {
        id: decode_uuid(&id, "meal_logs.id")?,
        user_id: decode_uuid(&user_id, "meal_logs.user_id")?,
        dish_id: dish_id
            .as_deref()
            .map(|d| decode_uuid(d, "meal_logs.dish_id"))
            .transpose()?,
        dish_name: row.get("dish_name"),
        meal_type: MealType::parse(&meal_type)?,
        calories: decode_u32(row.get("calories"), "meal_logs.calories")?,
        eaten_at: decode_timestamp(&eaten_at, "meal_logs.eaten_at")?,
        notes: row.get("notes"),
    })
}
