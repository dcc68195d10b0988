// ABOUTME: Database operations for admin promotions
// ABOUTME: CRUD plus the live-window query used by the catalogue and scoring
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{DateTime, Utc};
use mealmate_core::models::{Promotion, PromotionDraft};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::rows::{decode_timestamp, decode_uuid, encode_timestamp};
use crate::errors::{AppError, AppResult};

const PROMOTION_COLUMNS: &str =
    "id, title, description, dish_id, discount_percent, starts_at, ends_at, is_active, created_at";

/// Promotion storage
pub struct PromotionsManager {
    pool: SqlitePool,
}

impl PromotionsManager {
    /// Create a manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate and insert a promotion
    ///
    /// # Errors
    ///
    /// Returns a validation error or a database error
    pub async fn create(&self, draft: PromotionDraft) -> AppResult<Promotion> {
        draft.validate()?;

        let promotion = Promotion {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_owned(),
            description: draft.description,
            dish_id: draft.dish_id,
            discount_percent: draft.discount_percent,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            is_active: draft.is_active,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO promotions (
                id, title, description, dish_id, discount_percent,
                starts_at, ends_at, is_active, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(promotion.id.to_string())
        .bind(&promotion.title)
        .bind(&promotion.description)
        .bind(promotion.dish_id.map(|id| id.to_string()))
        .bind(promotion.discount_percent.map(i64::from))
        .bind(encode_timestamp(promotion.starts_at))
        .bind(encode_timestamp(promotion.ends_at))
        .bind(promotion.is_active)
        .bind(encode_timestamp(promotion.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create promotion: {e}")))?;

        Ok(promotion)
    }

    /// Every promotion, newest window first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list(&self) -> AppResult<Vec<Promotion>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions ORDER BY starts_at DESC, title ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list promotions: {e}")))?;

        rows.iter().map(row_to_promotion).collect()
    }

    /// Promotions live at `now`: active and `starts_at <= now < ends_at`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list_live(&self, now: DateTime<Utc>) -> AppResult<Vec<Promotion>> {
        let now = encode_timestamp(now);
        let rows = sqlx::query(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions \
             WHERE is_active = 1 AND starts_at <= $1 AND ends_at > $1 \
             ORDER BY ends_at ASC, title ASC"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list live promotions: {e}")))?;

        rows.iter().map(row_to_promotion).collect()
    }

    /// Fetch one promotion
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn get(&self, promotion_id: Uuid) -> AppResult<Option<Promotion>> {
        let row = sqlx::query(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE id = $1"
        ))
        .bind(promotion_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get promotion: {e}")))?;

        row.map(|r| row_to_promotion(&r)).transpose()
    }

    /// Replace a promotion's editable fields
    ///
    /// Returns `None` when the promotion does not exist.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a database error
    pub async fn update(
        &self,
        promotion_id: Uuid,
        draft: PromotionDraft,
    ) -> AppResult<Option<Promotion>> {
        draft.validate()?;
        let Some(existing) = self.get(promotion_id).await? else {
            return Ok(None);
        };

        let promotion = Promotion {
            id: existing.id,
            title: draft.title.trim().to_owned(),
            description: draft.description,
            dish_id: draft.dish_id,
            discount_percent: draft.discount_percent,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            is_active: draft.is_active,
            created_at: existing.created_at,
        };

        sqlx::query(
            r"
            UPDATE promotions SET
                title = $1, description = $2, dish_id = $3, discount_percent = $4,
                starts_at = $5, ends_at = $6, is_active = $7
            WHERE id = $8
            ",
        )
        .bind(&promotion.title)
        .bind(&promotion.description)
        .bind(promotion.dish_id.map(|id| id.to_string()))
        .bind(promotion.discount_percent.map(i64::from))
        .bind(encode_timestamp(promotion.starts_at))
        .bind(encode_timestamp(promotion.ends_at))
        .bind(promotion.is_active)
        .bind(promotion_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update promotion: {e}")))?;

        Ok(Some(promotion))
    }

    /// Delete a promotion; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, promotion_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
            .bind(promotion_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete promotion: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_promotion(row: &SqliteRow) -> AppResult<Promotion> {
    let id: String = row.get("id");
    let dish_id: Option<String> = row.get("dish_id");
    let discount: Option<i64> = row.get("discount_percent");
    let starts_at: String = row.get("starts_at");
    let ends_at: String = row.get("ends_at");
    let created_at: String = row.get("created_at");

    let discount_percent = discount
        .map(|d| {
            u8::try_from(d).map_err(|_| {
                AppError::internal(format!("promotions.discount_percent value {d} out of range"))
            })
        })
        .transpose()?;

    Ok(Promotion {
        id: decode_uuid(&id, "promotions.id")?,
        title: row.get("title"),
        description: row.get("description"),
        dish_id: dish_id
            .as_deref()
            .map(|d| decode_uuid(d, "promotions.dish_id"))
            .transpose()?,
        discount_percent,
        starts_at: decode_timestamp(&starts_at, "promotions.starts_at")?,
        ends_at: decode_timestamp(&ends_at, "promotions.ends_at")?,
        is_active: row.get("is_active"),
        created_at: decode_timestamp(&created_at, "promotions.created_at")?,
    })
}
