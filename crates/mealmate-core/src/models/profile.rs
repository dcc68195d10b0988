// ABOUTME: Virtual taste profile accumulated from user interactions
// ABOUTME: Maps cuisine origins and dish categories to preference scores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::DishCategory;
use crate::errors::{AppError, AppResult};

/// Kind of interaction a user had with a dish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Opened the dish detail
    View,
    /// Explicitly liked the dish
    Like,
    /// Logged the dish as eaten
    LogMeal,
    /// Dismissed a suggestion of the dish
    Dismiss,
}

impl InteractionKind {
    /// Score delta applied for this interaction
    #[must_use]
    pub const fn weight(&self) -> f64 {
        match self {
            Self::View => 0.5,
            Self::Like => 3.0,
            Self::LogMeal => 2.0,
            Self::Dismiss => -2.0,
        }
    }

    /// Parse from the stable string form
    ///
    /// # Errors
    ///
    /// Returns an error for unknown interaction kinds
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "like" => Ok(Self::Like),
            "log_meal" | "log" => Ok(Self::LogMeal),
            "dismiss" => Ok(Self::Dismiss),
            other => Err(AppError::invalid_input(format!(
                "Unknown interaction kind: {other}"
            ))),
        }
    }
}

/// Accumulated per-user preference scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualProfile {
    /// Owner
    pub user_id: Uuid,
    /// Preference score per cuisine origin
    pub origin_scores: BTreeMap<String, f64>,
    /// Preference score per dish category
    pub category_scores: BTreeMap<DishCategory, f64>,
    /// Number of interactions applied
    pub interactions: u32,
    /// Last update
    pub updated_at: DateTime<Utc>,
}

impl VirtualProfile {
    /// Empty profile for a user with no history
    #[must_use]
    pub fn empty(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            origin_scores: BTreeMap::new(),
            category_scores: BTreeMap::new(),
            interactions: 0,
            updated_at: now,
        }
    }

    /// Score for an origin (0 when unknown)
    #[must_use]
    pub fn origin_score(&self, origin: &str) -> f64 {
        self.origin_scores.get(origin).copied().unwrap_or(0.0)
    }

    /// Score for a category (0 when unknown)
    #[must_use]
    pub fn category_score(&self, category: DishCategory) -> f64 {
        self.category_scores.get(&category).copied().unwrap_or(0.0)
    }

    /// Whether no interaction has been recorded yet
    #[must_use]
    pub const fn is_cold(&self) -> bool {
        self.interactions == 0
    }
}
