// ABOUTME: Database operations for the curated dish catalogue
// ABOUTME: CRUD with case-insensitive unique names and filtered browsing by category, origin and text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::Utc;
use mealmate_core::models::{Dish, DishCategory, DishDraft, DishUpdate};
use serde::Deserialize;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use super::rows::{decode_json, decode_timestamp, decode_u32, decode_uuid, encode_timestamp};
use crate::errors::{AppError, AppResult};

const DISH_COLUMNS: &str = "id, name, category, origin, calories, description, image_url, \
                            ingredients, tags, is_active, created_at, updated_at";

/// Catalogue browsing filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DishFilter {
    /// Only this category
    #[serde(default)]
    pub category: Option<DishCategory>,
    /// Only this origin (case-insensitive)
    #[serde(default)]
    pub origin: Option<String>,
    /// Name substring (case-insensitive)
    #[serde(default)]
    pub q: Option<String>,
    /// Include inactive dishes (admin listing)
    #[serde(default)]
    pub include_inactive: bool,
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Dish catalogue storage
pub struct DishesManager {
    pool: SqlitePool,
}

impl DishesManager {
    /// Create a manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate and insert a new dish
    ///
    /// # Errors
    ///
    /// Returns a validation error, `ResourceAlreadyExists` for a duplicate
    /// name, or a database error
    pub async fn create(&self, draft: DishDraft) -> AppResult<Dish> {
        draft.validate()?;
        if self.find_by_name(&draft.name).await?.is_some() {
            return Err(AppError::already_exists(format!("Dish '{}'", draft.name.trim())));
        }

        let now = Utc::now();
        let dish = Dish {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_owned(),
            category: draft.category,
            origin: Dish::normalize_origin(&draft.origin),
            calories: draft.calories,
            description: draft.description,
            image_url: draft.image_url,
            ingredients: draft.ingredients,
            tags: draft.tags,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r"
            INSERT INTO dishes (
                id, name, name_key, category, origin, calories, description, image_url,
                ingredients, tags, is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            ",
        )
        .bind(dish.id.to_string())
        .bind(&dish.name)
        .bind(name_key(&dish.name))
        .bind(dish.category.as_str())
        .bind(&dish.origin)
        .bind(i64::from(dish.calories))
        .bind(&dish.description)
        .bind(&dish.image_url)
        .bind(serde_json::to_string(&dish.ingredients)?)
        .bind(serde_json::to_string(&dish.tags)?)
        .bind(dish.is_active)
        .bind(encode_timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create dish: {e}")))?;

        Ok(dish)
    }

    /// Fetch a dish by id, active or not
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn get(&self, dish_id: Uuid) -> AppResult<Option<Dish>> {
        let row = sqlx::query(&format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = $1"))
            .bind(dish_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get dish: {e}")))?;

        row.map(|r| row_to_dish(&r)).transpose()
    }

    /// Case-insensitive lookup by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Dish>> {
        let row = sqlx::query(&format!("SELECT {DISH_COLUMNS} FROM dishes WHERE name_key = $1"))
            .bind(name_key(name))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to find dish by name: {e}")))?;

        row.map(|r| row_to_dish(&r)).transpose()
    }

    /// List dishes matching `filter`, ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list(&self, filter: &DishFilter) -> AppResult<Vec<Dish>> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {DISH_COLUMNS} FROM dishes WHERE 1 = 1"));

        if !filter.include_inactive {
            query.push(" AND is_active = 1");
        }
        if let Some(category) = filter.category {
            query.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(origin) = filter.origin.as_deref().filter(|o| !o.trim().is_empty()) {
            query.push(" AND origin = ").push_bind(Dish::normalize_origin(origin));
        }
        if let Some(text) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            query
                .push(" AND name_key LIKE ")
                .push_bind(format!("%{}%", text.to_lowercase()));
        }
        query.push(" ORDER BY name_key ASC");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list dishes: {e}")))?;

        rows.iter().map(row_to_dish).collect()
    }

    /// Every active dish, the candidate pool for recommendations
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_active(&self) -> AppResult<Vec<Dish>> {
        self.list(&DishFilter::default()).await
    }

    /// Apply a partial update
    ///
    /// Returns `None` when the dish does not exist.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `ResourceAlreadyExists` when renaming onto
    /// another dish's name, or a database error
    pub async fn update(&self, dish_id: Uuid, update: DishUpdate) -> AppResult<Option<Dish>> {
        let Some(mut dish) = self.get(dish_id).await? else {
            return Ok(None);
        };

        if let Some(new_name) = update.name.as_deref() {
            if let Some(existing) = self.find_by_name(new_name).await? {
                if existing.id != dish_id {
                    return Err(AppError::already_exists(format!("Dish '{}'", new_name.trim())));
                }
            }
        }

        let now = Utc::now();
        update.apply(&mut dish, now)?;

        sqlx::query(
            r"
            UPDATE dishes SET
                name = $1, name_key = $2, category = $3, origin = $4, calories = $5,
                description = $6, image_url = $7, ingredients = $8, tags = $9,
                is_active = $10, updated_at = $11
            WHERE id = $12
            ",
        )
        .bind(&dish.name)
        .bind(name_key(&dish.name))
        .bind(dish.category.as_str())
        .bind(&dish.origin)
        .bind(i64::from(dish.calories))
        .bind(&dish.description)
        .bind(&dish.image_url)
        .bind(serde_json::to_string(&dish.ingredients)?)
        .bind(serde_json::to_string(&dish.tags)?)
        .bind(dish.is_active)
        .bind(encode_timestamp(now))
        .bind(dish_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update dish: {e}")))?;

        Ok(Some(dish))
    }

    /// Delete a dish; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, dish_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM dishes WHERE id = $1")
            .bind(dish_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete dish: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_dish(row: &SqliteRow) -> AppResult<Dish> {
    let id: String = row.get("id");
    let category: String = row.get("category");
    let ingredients: String = row.get("ingredients");
    let tags: String = row.get("tags");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Dish {
        id: decode_uuid(&id, "dishes.id")?,
        name: row.get("name"),
        category: DishCategory::parse(&category)?,
        origin: row.get("origin"),
        calories: decode_u32(row.get("calories"), "dishes.calories")?,
        description: row.get("description"),
        image_url: row.get("image_url"),
        ingredients: decode_json(&ingredients, "dishes.ingredients")?,
        tags: decode_json(&tags, "dishes.tags")?,
        is_active: row.get("is_active"),
        created_at: decode_timestamp(&created_at, "dishes.created_at")?,
        updated_at: decode_timestamp(&updated_at, "dishes.updated_at")?,
    })
}
