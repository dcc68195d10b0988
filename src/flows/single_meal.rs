// ABOUTME: Single-meal flow suggesting one dish for a meal slot
// ABOUTME: Candidates are ranked against the slot's calorie share; fallback is a random top pick
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use mealmate_core::models::{Dish, MealType};
use mealmate_intelligence::{
    choose_random_top, heuristic_reason, meal_calorie_target, rank_for_meal, ScoredDish,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Write as _;

use super::context::{candidates_json, UserContext};
use super::{parse_response, FlowError, FlowResult, FlowRunner};
use crate::errors::{AppError, AppResult};
use crate::llm::prompts::{render, system_prompt, SINGLE_MEAL_TEMPLATE};
use crate::llm::ChatMessage;

/// Longest free-text preference passed to the model
const MAX_PREFERENCES_CHARS: usize = 500;

/// Single-meal payload
#[derive(Debug, Clone, Serialize)]
pub struct SingleMealSuggestion {
    /// Slot
    pub meal_type: MealType,
    /// Calorie budget used for ranking
    pub calorie_target: u32,
    /// Suggested dish
    pub dish: Dish,
    /// Why it was picked
    pub reason: String,
}

#[derive(Deserialize)]
struct ModelMeal {
    name: String,
    #[serde(default)]
    reason: Option<String>,
}

fn validate_meal(value: Value, candidates: &[ScoredDish]) -> Result<(Dish, String), FlowError> {
    let meal: ModelMeal = parse_response(value)?;
    let scored = candidates
        .iter()
        .find(|s| s.dish.name_matches(&meal.name))
        .ok_or_else(|| {
            FlowError::Validation(vec![format!(
                "\"{}\" is not one of the candidate dishes",
                meal.name
            )])
        })?;
    let reason = meal
        .reason
        .map(|r| r.trim().to_owned())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| heuristic_reason(scored));
    Ok((scored.dish.clone(), reason))
}

impl FlowRunner {
    /// Suggest one dish for `meal_type`
    ///
    /// `daily_target` is split by the slot's calorie share before ranking.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when no active dish fits the slot
    pub async fn suggest_single_meal(
        &self,
        ctx: &UserContext,
        meal_type: MealType,
        preferences: Option<&str>,
        daily_target: u32,
        rng: &mut (impl Rng + Send),
    ) -> AppResult<FlowResult<SingleMealSuggestion>> {
        let calorie_target = meal_calorie_target(daily_target, meal_type);
        let scoring = ctx.scoring().with_calorie_target(Some(calorie_target));
        let ranked = rank_for_meal(&ctx.catalogue, &scoring, meal_type);
        if ranked.is_empty() {
            return Err(AppError::not_found(format!(
                "Dish suitable for {}",
                meal_type.as_str()
            )));
        }

        let candidates = &ranked[..self.config().max_candidates.min(ranked.len())];
        let task = render(
            SINGLE_MEAL_TEMPLATE,
            &[
                ("meal_type", meal_type.as_str().to_owned()),
                ("calorie_target", calorie_target.to_string()),
            ],
        );

        let mut user_prompt = ctx.user_summary(Some(daily_target));
        if let Some(preferences) = preferences.map(str::trim).filter(|p| !p.is_empty()) {
            let preferences: String = preferences.chars().take(MAX_PREFERENCES_CHARS).collect();
            let _ = writeln!(user_prompt, "The user asked for: {preferences}");
        }
        let _ = write!(user_prompt, "Candidate dishes:\n{}", candidates_json(candidates));

        let messages = vec![
            ChatMessage::system(system_prompt(&task)),
            ChatMessage::user(user_prompt),
        ];

        let (picked, attempts) = self
            .run("single_meal", messages, |value| validate_meal(value, candidates))
            .await;

        if let Some((dish, reason)) = picked {
            return Ok(FlowResult::ai(
                attempts,
                SingleMealSuggestion {
                    meal_type,
                    calorie_target,
                    dish,
                    reason,
                },
            ));
        }

        let choice = choose_random_top(&ranked, &HashSet::new(), rng)
            .ok_or_else(|| AppError::internal("Ranking produced no fallback candidate"))?;
        Ok(FlowResult::fallback(
            attempts,
            SingleMealSuggestion {
                meal_type,
                calorie_target,
                dish: choice.dish.clone(),
                reason: heuristic_reason(choice),
            },
        ))
    }
}
