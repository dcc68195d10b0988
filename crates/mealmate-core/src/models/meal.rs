// ABOUTME: Meal log model recording what a user ate and when
// ABOUTME: Supports catalogue-linked entries and free-text entries with explicit calories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MealType;
use crate::constants::limits::MAX_DISH_CALORIES;
use crate::errors::{AppError, AppResult};

/// A logged meal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealLog {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Catalogue dish, if the entry refers to one
    pub dish_id: Option<Uuid>,
    /// Dish name as eaten
    pub dish_name: String,
    /// Meal slot
    pub meal_type: MealType,
    /// Calories consumed
    pub calories: u32,
    /// When the meal was eaten
    pub eaten_at: DateTime<Utc>,
    /// Optional notes
    pub notes: Option<String>,
}

/// Request to log a meal
///
/// Either `dish_id` refers to a catalogue dish (name and calories are then
/// taken from the catalogue unless overridden), or `dish_name` and `calories`
/// are both supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMealRequest {
    /// Catalogue dish
    #[serde(default)]
    pub dish_id: Option<Uuid>,
    /// Free-text dish name
    #[serde(default)]
    pub dish_name: Option<String>,
    /// Meal slot
    pub meal_type: MealType,
    /// Calories (overrides catalogue value)
    #[serde(default)]
    pub calories: Option<u32>,
    /// When the meal was eaten (defaults to now)
    #[serde(default)]
    pub eaten_at: Option<DateTime<Utc>>,
    /// Optional notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl LogMealRequest {
    /// Validate a free-text entry (no `dish_id`)
    ///
    /// # Errors
    ///
    /// Returns an error if name or calories are missing or calories are out of range
    pub fn validate_free_text(&self) -> AppResult<(String, u32)> {
        let name = self
            .dish_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                AppError::invalid_input("dish_name is required when dish_id is not provided")
            })?;
        let calories = self.calories.ok_or_else(|| {
            AppError::invalid_input("calories are required when dish_id is not provided")
        })?;
        validate_logged_calories(calories)?;
        Ok((name.to_owned(), calories))
    }
}

/// Validate a calorie value on a log entry
///
/// # Errors
///
/// Returns an error if calories are zero or above the per-dish ceiling
pub fn validate_logged_calories(calories: u32) -> AppResult<()> {
    if calories == 0 || calories > MAX_DISH_CALORIES {
        return Err(AppError::out_of_range(format!(
            "Calories must be between 1 and {MAX_DISH_CALORIES}"
        )));
    }
    Ok(())
}
