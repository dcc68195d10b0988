// ABOUTME: Hand-built dish scoring heuristic blending taste, fridge, calories and recency
// ABOUTME: Produces a deterministic ranking of the active catalogue for one user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! # Dish Scoring
//!
//! `score = 2.0·squash(origin) + 1.5·squash(category) + fridge_match
//!        + calorie_fit − 1.5·recent + 0.5·promoted`
//!
//! where `squash(s) = s / (|s| + 5)` keeps accumulated preferences in `(-1, 1)`
//! so a long history does not drown out the other signals.

use mealmate_core::constants::scoring::{
    CATEGORY_WEIGHT, FRIDGE_WEIGHT, ORIGIN_WEIGHT, PROMOTION_BONUS, RECENT_PENALTY, SQUASH_K,
};
use mealmate_core::models::{Dish, MealType, VirtualProfile};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use uuid::Uuid;

/// Everything the heuristic needs to know about the user
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    /// Accumulated taste profile
    pub profile: &'a VirtualProfile,
    /// Dishes eaten within the recency window
    pub recent_dish_ids: HashSet<Uuid>,
    /// Lower-cased, trimmed fridge item names
    pub fridge_items: Vec<String>,
    /// Calorie target for the slot being filled, if any
    pub calorie_target: Option<u32>,
    /// Dishes with a live promotion
    pub promoted_dish_ids: HashSet<Uuid>,
}

impl<'a> ScoringContext<'a> {
    /// Context with only a profile
    #[must_use]
    pub fn new(profile: &'a VirtualProfile) -> Self {
        Self {
            profile,
            recent_dish_ids: HashSet::new(),
            fridge_items: Vec::new(),
            calorie_target: None,
            promoted_dish_ids: HashSet::new(),
        }
    }

    /// Set recently eaten dishes
    #[must_use]
    pub fn with_recent(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.recent_dish_ids = ids.into_iter().collect();
        self
    }

    /// Set fridge item names (normalized here)
    #[must_use]
    pub fn with_fridge<S: AsRef<str>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.fridge_items = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        self
    }

    /// Set the calorie target
    #[must_use]
    pub const fn with_calorie_target(mut self, target: Option<u32>) -> Self {
        self.calorie_target = target;
        self
    }

    /// Set promoted dishes
    #[must_use]
    pub fn with_promoted(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.promoted_dish_ids = ids.into_iter().collect();
        self
    }
}

/// Per-signal contributions to a dish score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Weighted origin preference
    pub origin: f64,
    /// Weighted category preference
    pub category: f64,
    /// Fraction of ingredients already in the fridge
    pub fridge: f64,
    /// Closeness to the calorie target
    pub calorie_fit: f64,
    /// Recency penalty (zero or negative)
    pub recency: f64,
    /// Promotion bonus
    pub promotion: f64,
}

impl ScoreBreakdown {
    /// Sum of all contributions
    #[must_use]
    pub fn total(&self) -> f64 {
        self.origin + self.category + self.fridge + self.calorie_fit + self.recency + self.promotion
    }
}

/// A dish with its score
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDish {
    /// The dish
    pub dish: Dish,
    /// Total score
    pub score: f64,
    /// Contributions per signal
    pub breakdown: ScoreBreakdown,
}

fn squash(score: f64) -> f64 {
    score / (score.abs() + SQUASH_K)
}

/// Whether an ingredient and a fridge item name refer to the same thing
fn ingredient_matches(ingredient: &str, fridge_item: &str) -> bool {
    !ingredient.is_empty() && (ingredient.contains(fridge_item) || fridge_item.contains(ingredient))
}

/// Fraction of `dish` ingredients found in `fridge_items` (already normalized)
#[must_use]
pub fn fridge_match(dish: &Dish, fridge_items: &[String]) -> f64 {
    if dish.ingredients.is_empty() || fridge_items.is_empty() {
        return 0.0;
    }
    let matched = dish
        .ingredients
        .iter()
        .map(|i| i.trim().to_lowercase())
        .filter(|ingredient| fridge_items.iter().any(|f| ingredient_matches(ingredient, f)))
        .count();
    matched as f64 / dish.ingredients.len() as f64
}

/// `1 - min(|calories - target| / target, 1)`
#[must_use]
pub fn calorie_fit(calories: u32, target: Option<u32>) -> f64 {
    match target {
        Some(t) if t > 0 => {
            let deviation = (f64::from(calories) - f64::from(t)).abs() / f64::from(t);
            1.0 - deviation.min(1.0)
        }
        _ => 0.0,
    }
}

/// Score one dish
#[must_use]
pub fn score_dish(dish: &Dish, ctx: &ScoringContext<'_>) -> ScoreBreakdown {
    ScoreBreakdown {
        origin: ORIGIN_WEIGHT * squash(ctx.profile.origin_score(&Dish::normalize_origin(&dish.origin))),
        category: CATEGORY_WEIGHT * squash(ctx.profile.category_score(dish.category)),
        fridge: FRIDGE_WEIGHT * fridge_match(dish, &ctx.fridge_items),
        calorie_fit: calorie_fit(dish.calories, ctx.calorie_target),
        recency: if ctx.recent_dish_ids.contains(&dish.id) {
            -RECENT_PENALTY
        } else {
            0.0
        },
        promotion: if ctx.promoted_dish_ids.contains(&dish.id) {
            PROMOTION_BONUS
        } else {
            0.0
        },
    }
}

fn compare_scored(a: &ScoredDish, b: &ScoredDish) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.dish.name.to_lowercase().cmp(&b.dish.name.to_lowercase()))
        .then_with(|| a.dish.id.cmp(&b.dish.id))
}

/// Rank active dishes, best first
///
/// Ties are broken by name then id so identical inputs always rank identically.
#[must_use]
pub fn rank_dishes<'d>(
    dishes: impl IntoIterator<Item = &'d Dish>,
    ctx: &ScoringContext<'_>,
) -> Vec<ScoredDish> {
    let mut scored: Vec<ScoredDish> = dishes
        .into_iter()
        .filter(|d| d.is_active)
        .map(|dish| {
            let breakdown = score_dish(dish, ctx);
            ScoredDish {
                dish: dish.clone(),
                score: breakdown.total(),
                breakdown,
            }
        })
        .collect();
    scored.sort_by(compare_scored);
    scored
}

/// Rank active dishes that may fill `meal_type`
#[must_use]
pub fn rank_for_meal<'d>(
    dishes: impl IntoIterator<Item = &'d Dish>,
    ctx: &ScoringContext<'_>,
    meal_type: MealType,
) -> Vec<ScoredDish> {
    rank_dishes(
        dishes.into_iter().filter(|d| meal_type.accepts(d.category)),
        ctx,
    )
}

/// Short human-readable reason derived from the strongest positive signal
#[must_use]
pub fn heuristic_reason(scored: &ScoredDish) -> String {
    let b = &scored.breakdown;
    let dish = &scored.dish;
    let signals = [
        (b.fridge, "Uses ingredients from your fridge".to_owned()),
        (b.origin, format!("You often enjoy {} dishes", dish.origin)),
        (b.category, format!("Matches your liking for {}", dish.category.as_str().replace('_', " "))),
        (b.calorie_fit, format!("Fits your calorie goal at {} kcal", dish.calories)),
        (b.promotion, "Currently on promotion".to_owned()),
    ];
    signals
        .into_iter()
        .filter(|(value, _)| *value > 0.0)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map_or_else(
            || format!("A popular {} choice", dish.category.as_str().replace('_', " ")),
            |(_, reason)| reason,
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mealmate_core::models::DishCategory;

    fn dish(name: &str, origin: &str, category: DishCategory, calories: u32, ingredients: &[&str]) -> Dish {
        let now = Utc::now();
        Dish {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            category,
            origin: origin.to_owned(),
            calories,
            description: None,
            image_url: None,
            ingredients: ingredients.iter().map(|s| (*s).to_owned()).collect(),
            tags: vec![],
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_fridge_match_uses_substring_both_ways() {
        let omelette = dish("Omelette", "french", DishCategory::Breakfast, 300, &["Eggs", "butter", "chives"]);
        let fridge = vec!["egg".to_owned(), "salted butter".to_owned()];
        let ratio = fridge_match(&omelette, &fridge);
        assert!((ratio - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_calorie_fit_bounds() {
        assert!((calorie_fit(500, Some(500)) - 1.0).abs() < 1e-9);
        assert!((calorie_fit(750, Some(500)) - 0.5).abs() < 1e-9);
        assert!(calorie_fit(2000, Some(500)).abs() < 1e-9);
        assert!(calorie_fit(500, None).abs() < 1e-9);
    }

    #[test]
    fn test_preferred_origin_ranks_first() {
        let mut profile = VirtualProfile::empty(Uuid::new_v4(), Utc::now());
        profile.origin_scores.insert("vietnamese".to_owned(), 10.0);

        let pho = dish("Pho", "Vietnamese", DishCategory::Soup, 450, &[]);
        let ramen = dish("Ramen", "japanese", DishCategory::Soup, 450, &[]);
        let catalogue = [ramen, pho];

        let ctx = ScoringContext::new(&profile);
        let ranked = rank_dishes(catalogue.iter(), &ctx);
        assert_eq!(ranked[0].dish.name, "Pho");
        assert!((ranked[0].breakdown.origin - 2.0 * 10.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_recent_dish_is_penalised_and_inactive_dropped() {
        let profile = VirtualProfile::empty(Uuid::new_v4(), Utc::now());
        let pho = dish("Pho", "vietnamese", DishCategory::Soup, 450, &[]);
        let bun = dish("Bun Cha", "vietnamese", DishCategory::MainCourse, 600, &[]);
        let mut hidden = dish("Hidden", "vietnamese", DishCategory::Soup, 450, &[]);
        hidden.is_active = false;

        let ctx = ScoringContext::new(&profile).with_recent([pho.id]);
        let catalogue = [pho, bun, hidden];
        let ranked = rank_dishes(catalogue.iter(), &ctx);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].dish.name, "Bun Cha");
        assert!((ranked[1].score + RECENT_PENALTY).abs() < 1e-9);
    }

    #[test]
    fn test_promoted_dish_gets_bonus() {
        let profile = VirtualProfile::empty(Uuid::new_v4(), Utc::now());
        let ramen = dish("Ramen", "japanese", DishCategory::Soup, 450, &[]);
        let udon = dish("Udon", "japanese", DishCategory::Soup, 450, &[]);

        let ctx = ScoringContext::new(&profile).with_promoted([udon.id]);
        assert!((score_dish(&udon, &ctx).promotion - PROMOTION_BONUS).abs() < 1e-9);
        assert!(score_dish(&ramen, &ctx).promotion.abs() < 1e-9);

        let catalogue = [ramen, udon];
        let ranked = rank_dishes(catalogue.iter(), &ctx);
        assert_eq!(ranked[0].dish.name, "Udon");
        assert!((ranked[0].score - ranked[1].score - PROMOTION_BONUS).abs() < 1e-9);
    }

    #[test]
    fn test_ties_break_by_name() {
        let profile = VirtualProfile::empty(Uuid::new_v4(), Utc::now());
        let catalogue = [
            dish("Zucchini Soup", "french", DishCategory::Soup, 200, &[]),
            dish("apple pie", "american", DishCategory::Dessert, 400, &[]),
            dish("Miso Soup", "japanese", DishCategory::Soup, 100, &[]),
        ];
        let ctx = ScoringContext::new(&profile);
        let names: Vec<String> = rank_dishes(catalogue.iter(), &ctx)
            .into_iter()
            .map(|s| s.dish.name)
            .collect();
        assert_eq!(names, vec!["apple pie", "Miso Soup", "Zucchini Soup"]);
    }

    #[test]
    fn test_rank_for_meal_filters_categories() {
        let profile = VirtualProfile::empty(Uuid::new_v4(), Utc::now());
        let catalogue = [
            dish("Porridge", "scottish", DishCategory::Breakfast, 350, &[]),
            dish("Steak", "argentinian", DishCategory::MainCourse, 800, &[]),
        ];
        let ctx = ScoringContext::new(&profile);
        let ranked = rank_for_meal(catalogue.iter(), &ctx, MealType::Breakfast);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].dish.name, "Porridge");
    }

    #[test]
    fn test_heuristic_reason_prefers_fridge() {
        let profile = VirtualProfile::empty(Uuid::new_v4(), Utc::now());
        let omelette = dish("Omelette", "french", DishCategory::Breakfast, 300, &["egg"]);
        let ctx = ScoringContext::new(&profile).with_fridge(["Egg"]);
        let catalogue = [omelette];
        let ranked = rank_dishes(catalogue.iter(), &ctx);
        assert_eq!(heuristic_reason(&ranked[0]), "Uses ingredients from your fridge");
    }
}
