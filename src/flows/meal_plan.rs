// ABOUTME: Multi-day meal plan flow covering one to fourteen consecutive days
// ABOUTME: Validates day numbering, per-day rules and slot repeats across consecutive days
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{Days, NaiveDate};
use mealmate_core::constants::limits::{DEFAULT_PLAN_DAYS, MAX_PLAN_DAYS};
use mealmate_intelligence::{fallback_meal_plan, validate_meal_plan, MealPlan, ProposedDay};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::context::UserContext;
use super::day_plan::{per_slot_budget, slot_candidates, slot_candidates_prompt, violation_messages};
use super::{parse_response, FlowError, FlowResult, FlowRunner};
use crate::errors::{AppError, AppResult};
use crate::llm::prompts::{render, system_prompt, MEAL_PLAN_TEMPLATE};
use crate::llm::ChatMessage;

/// Meal-plan payload
#[derive(Debug, Clone, Serialize)]
pub struct MealPlanSuggestion {
    /// Daily calorie target every day was built for
    pub calorie_target: u32,
    /// First planned day
    pub start_date: NaiveDate,
    /// The plan
    pub plan: MealPlan,
}

#[derive(Deserialize)]
struct ModelPlan {
    #[serde(default)]
    days: Vec<ProposedDay>,
}

impl FlowRunner {
    /// Plan `days` consecutive days starting at `start_date`
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` when `days` is outside `1..=14` or the plan
    /// would run past the last representable date
    pub async fn suggest_meal_plan(
        &self,
        ctx: &UserContext,
        start_date: NaiveDate,
        days: Option<u32>,
        daily_target: u32,
        rng: &mut (impl Rng + Send),
    ) -> AppResult<FlowResult<MealPlanSuggestion>> {
        let days = days.unwrap_or(DEFAULT_PLAN_DAYS);
        if !(1..=MAX_PLAN_DAYS).contains(&days) {
            return Err(AppError::out_of_range(format!(
                "days must be between 1 and {MAX_PLAN_DAYS}"
            )));
        }
        if start_date
            .checked_add_days(Days::new(u64::from(days - 1)))
            .is_none()
        {
            return Err(AppError::out_of_range("Plan runs past the last supported date"));
        }

        let per_slot = per_slot_budget(self.config().max_candidates);
        let slots = slot_candidates(ctx, daily_target, per_slot);

        let attempts = if slots.iter().all(|(_, c)| c.is_empty()) {
            0
        } else {
            let task = render(
                MEAL_PLAN_TEMPLATE,
                &[
                    ("days", days.to_string()),
                    ("calorie_target", daily_target.to_string()),
                ],
            );
            let messages = vec![
                ChatMessage::system(system_prompt(&task)),
                ChatMessage::user(format!(
                    "{}\n{}",
                    ctx.user_summary(Some(daily_target)),
                    slot_candidates_prompt(&slots)
                )),
            ];

            let (plan, attempts) = self
                .run("meal_plan", messages, |value: Value| {
                    let proposed: ModelPlan = parse_response(value)?;
                    validate_meal_plan(
                        &proposed.days,
                        &ctx.catalogue,
                        daily_target,
                        start_date,
                        days,
                    )
                    .map_err(|v| FlowError::Validation(violation_messages(&v)))
                })
                .await;

            if let Some(plan) = plan {
                return Ok(FlowResult::ai(
                    attempts,
                    MealPlanSuggestion {
                        calorie_target: daily_target,
                        start_date,
                        plan,
                    },
                ));
            }
            attempts
        };

        let plan = fallback_meal_plan(
            &ctx.catalogue,
            &ctx.scoring(),
            daily_target,
            start_date,
            days,
            rng,
        );
        Ok(FlowResult::fallback(
            attempts,
            MealPlanSuggestion {
                calorie_target: daily_target,
                start_date,
                plan,
            },
        ))
    }
}
