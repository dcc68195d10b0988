// ABOUTME: Database operations for the per-user virtual fridge
// ABOUTME: Add, list, update, remove and expiring-window queries, all scoped by owner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{Days, NaiveDate, Utc};
use mealmate_core::models::{FridgeItem, FridgeItemDraft, FridgeItemUpdate};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::rows::{decode_date, decode_timestamp, decode_uuid, encode_date, encode_timestamp};
use crate::errors::{AppError, AppResult};

const FRIDGE_COLUMNS: &str = "id, user_id, name, quantity, unit, expires_on, added_at";

/// Fridge inventory storage
pub struct FridgeManager {
    pool: SqlitePool,
}

impl FridgeManager {
    /// Create a manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate and add an item to the user's fridge
    ///
    /// # Errors
    ///
    /// Returns a validation error or a database error
    pub async fn add(&self, user_id: Uuid, draft: FridgeItemDraft) -> AppResult<FridgeItem> {
        draft.validate()?;

        let item = FridgeItem {
            id: Uuid::new_v4(),
            user_id,
            name: draft.name.trim().to_owned(),
            quantity: draft.quantity,
            unit: draft.unit,
            expires_on: draft.expires_on,
            added_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO fridge_items (id, user_id, name, quantity, unit, expires_on, added_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(item.id.to_string())
        .bind(user_id.to_string())
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.expires_on.map(encode_date))
        .bind(encode_timestamp(item.added_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add fridge item: {e}")))?;

        Ok(item)
    }

    /// Every item in the user's fridge, soonest expiry first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<FridgeItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {FRIDGE_COLUMNS} FROM fridge_items WHERE user_id = $1 \
             ORDER BY expires_on IS NULL, expires_on ASC, name ASC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list fridge items: {e}")))?;

        rows.iter().map(row_to_item).collect()
    }

    /// One of the user's items
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn get(&self, user_id: Uuid, item_id: Uuid) -> AppResult<Option<FridgeItem>> {
        let row = sqlx::query(&format!(
            "SELECT {FRIDGE_COLUMNS} FROM fridge_items WHERE id = $1 AND user_id = $2"
        ))
        .bind(item_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get fridge item: {e}")))?;

        row.map(|r| row_to_item(&r)).transpose()
    }

    /// Apply a partial update to one of the user's items
    ///
    /// Returns `None` when the item does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a database error
    pub async fn update(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        update: FridgeItemUpdate,
    ) -> AppResult<Option<FridgeItem>> {
        let Some(mut item) = self.get(user_id, item_id).await? else {
            return Ok(None);
        };
        update.apply(&mut item)?;

        sqlx::query(
            r"
            UPDATE fridge_items SET name = $1, quantity = $2, unit = $3, expires_on = $4
            WHERE id = $5 AND user_id = $6
            ",
        )
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.expires_on.map(encode_date))
        .bind(item_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update fridge item: {e}")))?;

        Ok(Some(item))
    }

    /// Remove one of the user's items; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn remove(&self, user_id: Uuid, item_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM fridge_items WHERE id = $1 AND user_id = $2")
            .bind(item_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to remove fridge item: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Items expiring between `today` and `today + days`, inclusive
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn expiring_within(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        days: u32,
    ) -> AppResult<Vec<FridgeItem>> {
        let last_day = today
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(|| AppError::out_of_range("Expiry window is out of range"))?;

        let rows = sqlx::query(&format!(
            "SELECT {FRIDGE_COLUMNS} FROM fridge_items \
             WHERE user_id = $1 AND expires_on IS NOT NULL AND expires_on >= $2 AND expires_on <= $3 \
             ORDER BY expires_on ASC, name ASC"
        ))
        .bind(user_id.to_string())
        .bind(encode_date(today))
        .bind(encode_date(last_day))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list expiring items: {e}")))?;

        rows.iter().map(row_to_item).collect()
    }
}

fn row_to_item(row: &SqliteRow) -> AppResult<FridgeItem> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let expires_on: Option<String> = row.get("expires_on");
    let added_at: String = row.get("added_at");

    Ok(FridgeItem {
        id: decode_uuid(&id, "fridge_items.id")?,
        user_id: decode_uuid(&user_id, "fridge_items.user_id")?,
        name: row.get("name"),
        quantity: row.get("quantity"),
        unit: row.get("unit"),
        expires_on: expires_on
            .as_deref()
            .map(|d| decode_date(d, "fridge_items.expires_on"))
            .transpose()?,
        added_at: decode_timestamp(&added_at, "fridge_items.added_at")?,
    })
}
