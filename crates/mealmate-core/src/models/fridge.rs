// ABOUTME: Virtual fridge inventory model
// ABOUTME: Tracks user-owned ingredients with quantities and optional expiry dates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// An ingredient in a user's virtual fridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FridgeItem {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Ingredient name
    pub name: String,
    /// Quantity in `unit`
    pub quantity: f64,
    /// Unit label (g, ml, pcs, ...)
    pub unit: String,
    /// Optional expiry date
    pub expires_on: Option<NaiveDate>,
    /// When the item was added
    pub added_at: DateTime<Utc>,
}

impl FridgeItem {
    /// Whether the item expires within `days` of `today` (inclusive) and has not expired yet
    #[must_use]
    pub fn is_expiring(&self, today: NaiveDate, days: u32) -> bool {
        self.expires_on.is_some_and(|date| {
            date >= today && (date - today).num_days() <= i64::from(days)
        })
    }

    /// Whether the item is already past its expiry date
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on.is_some_and(|date| date < today)
    }
}

/// Request body to add an item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FridgeItemDraft {
    /// Ingredient name
    pub name: String,
    /// Quantity
    pub quantity: f64,
    /// Unit label
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Optional expiry date
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

fn default_unit() -> String {
    "pcs".to_owned()
}

impl FridgeItemDraft {
    /// Validate draft fields
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or quantity is not positive
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_input("Fridge item name must not be empty"));
        }
        validate_quantity(self.quantity)
    }
}

/// Partial update of a fridge item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FridgeItemUpdate {
    /// New name
    pub name: Option<String>,
    /// New quantity
    pub quantity: Option<f64>,
    /// New unit
    pub unit: Option<String>,
    /// New expiry date
    pub expires_on: Option<NaiveDate>,
}

impl FridgeItemUpdate {
    /// Apply this update onto an existing item
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting item would be invalid
    pub fn apply(self, item: &mut FridgeItem) -> AppResult<()> {
        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(AppError::invalid_input("Fridge item name must not be empty"));
            }
            item.name = name.trim().to_owned();
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
            item.quantity = quantity;
        }
        if let Some(unit) = self.unit {
            item.unit = unit;
        }
        if self.expires_on.is_some() {
            item.expires_on = self.expires_on;
        }
        Ok(())
    }
}

fn validate_quantity(quantity: f64) -> AppResult<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(AppError::out_of_range("Quantity must be a positive number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(expires_on: Option<NaiveDate>) -> FridgeItem {
        FridgeItem {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "milk".to_owned(),
            quantity: 1.0,
            unit: "l".to_owned(),
            expires_on,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_expiring_window_is_inclusive() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap_or_default();
        let in_three = today + chrono::Days::new(3);
        let in_four = today + chrono::Days::new(4);

        assert!(item(Some(today)).is_expiring(today, 3));
        assert!(item(Some(in_three)).is_expiring(today, 3));
        assert!(!item(Some(in_four)).is_expiring(today, 3));
        assert!(!item(None).is_expiring(today, 3));
    }

    #[test]
    fn test_expired_items_are_not_expiring() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap_or_default();
        let yesterday = today - chrono::Days::new(1);
        let milk = item(Some(yesterday));

        assert!(milk.is_expired(today));
        assert!(!milk.is_expiring(today, 3));
    }
}
