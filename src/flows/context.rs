// ABOUTME: Per-request snapshot of everything a flow needs to know about one user
// ABOUTME: Loads catalogue, taste profile, recent meals, fridge, promotions and nutrition in one place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{DateTime, Duration, NaiveDate, Utc};
use mealmate_core::constants::limits::DEFAULT_EXPIRING_DAYS;
use mealmate_core::constants::scoring::RECENCY_DAYS;
use mealmate_core::models::{Dish, FridgeItem, NutritionProfile, VirtualProfile};
use mealmate_intelligence::{daily_calorie_target, top_origins, ScoredDish, ScoringContext};
use serde_json::json;
use std::collections::HashSet;
use std::fmt::Write as _;
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};

/// Origins mentioned in the taste summary
const SUMMARY_ORIGINS: usize = 3;

/// Inputs shared by every flow for one user at one moment
#[derive(Debug, Clone)]
pub struct UserContext {
    /// The user
    pub user_id: Uuid,
    /// Active catalogue
    pub catalogue: Vec<Dish>,
    /// Accumulated tastes
    pub profile: VirtualProfile,
    /// Dishes eaten within the recency window
    pub recent_dish_ids: HashSet<Uuid>,
    /// Fridge inventory
    pub fridge: Vec<FridgeItem>,
    /// Dishes with a live promotion
    pub promoted_dish_ids: HashSet<Uuid>,
    /// Body metrics, when the user filled them in
    pub nutrition: Option<NutritionProfile>,
    /// Snapshot time
    pub now: DateTime<Utc>,
    /// UTC calendar day of `now`
    pub today: NaiveDate,
}

impl UserContext {
    /// Load the snapshot for `user_id` at `now`
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user, or a database error
    pub async fn load(db: &Database, user_id: Uuid, now: DateTime<Utc>) -> AppResult<Self> {
        let user = db
            .users()
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let catalogue = db.dishes().list_active().await?;
        let profile = db.profiles().get_or_default(user_id).await?;
        let recent_dish_ids = db
            .meals()
            .list_since(user_id, now - Duration::days(RECENCY_DAYS))
            .await?
            .into_iter()
            .filter_map(|log| log.dish_id)
            .collect();
        let fridge = db.fridge().list(user_id).await?;
        let promoted_dish_ids = db
            .promotions()
            .list_live(now)
            .await?
            .into_iter()
            .filter_map(|p| p.dish_id)
            .collect();

        Ok(Self {
            user_id,
            catalogue,
            profile,
            recent_dish_ids,
            fridge,
            promoted_dish_ids,
            nutrition: user.nutrition,
            now,
            today: now.date_naive(),
        })
    }

    /// Normalized fridge item names in inventory order
    #[must_use]
    pub fn fridge_names(&self) -> Vec<String> {
        self.fridge
            .iter()
            .map(|item| item.name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Scoring inputs without a calorie target
    #[must_use]
    pub fn scoring(&self) -> ScoringContext<'_> {
        ScoringContext::new(&self.profile)
            .with_recent(self.recent_dish_ids.iter().copied())
            .with_fridge(self.fridge.iter().map(|item| item.name.as_str()))
            .with_promoted(self.promoted_dish_ids.iter().copied())
    }

    /// Plain-text description of the user for the prompt
    #[must_use]
    pub fn user_summary(&self, daily_target: Option<u32>) -> String {
        let mut summary = String::new();

        let origins = top_origins(&self.profile, SUMMARY_ORIGINS);
        if origins.is_empty() {
            summary.push_str("Favourite cuisines: unknown yet\n");
        } else {
            let names: Vec<&str> = origins.iter().map(|(o, _)| o.as_str()).collect();
            let _ = writeln!(summary, "Favourite cuisines: {}", names.join(", "));
        }

        let mut categories: Vec<_> = self
            .profile
            .category_scores
            .iter()
            .filter(|(_, score)| **score > 0.0)
            .collect();
        categories.sort_by(|a, b| b.1.total_cmp(a.1));
        if !categories.is_empty() {
            let names: Vec<&str> = categories
                .iter()
                .take(SUMMARY_ORIGINS)
                .map(|(c, _)| c.as_str())
                .collect();
            let _ = writeln!(summary, "Favourite dish types: {}", names.join(", "));
        }

        if let Some(target) = daily_target {
            let _ = writeln!(summary, "Daily calorie goal: {target} kcal");
        }

        if self.fridge.is_empty() {
            summary.push_str("Fridge: empty\n");
        } else {
            let items: Vec<String> = self
                .fridge
                .iter()
                .map(|item| {
                    if item.is_expiring(self.today, DEFAULT_EXPIRING_DAYS) {
                        format!("{} (expiring)", item.name)
                    } else {
                        item.name.clone()
                    }
                })
                .collect();
            let _ = writeln!(summary, "Fridge: {}", items.join(", "));
        }

        summary
    }
}

/// Compact JSON listing of candidates for a prompt
#[must_use]
pub fn candidates_json(candidates: &[ScoredDish]) -> String {
    let list: Vec<serde_json::Value> = candidates
        .iter()
        .map(|scored| {
            let dish = &scored.dish;
            json!({
                "name": dish.name,
                "category": dish.category,
                "origin": dish.origin,
                "calories": dish.calories,
                "ingredients": dish.ingredients,
            })
        })
        .collect();
    serde_json::Value::Array(list).to_string()
}

/// Daily calorie target: explicit request, else nutrition profile, else `default`
///
/// # Errors
///
/// Returns `ValueOutOfRange` for a zero request or an invalid nutrition profile
pub fn resolve_daily_target(
    requested: Option<u32>,
    nutrition: Option<&NutritionProfile>,
    default: u32,
) -> AppResult<u32> {
    match (requested, nutrition) {
        (Some(0), _) => Err(AppError::out_of_range("calorie_target must be positive")),
        (Some(target), _) => Ok(target),
        (None, Some(profile)) => daily_calorie_target(profile),
        (None, None) => Ok(default),
    }
}
