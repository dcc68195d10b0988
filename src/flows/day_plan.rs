// ABOUTME: Day-plan flow filling breakfast, lunch, dinner and snack for one date
// ABOUTME: Shares per-slot candidate building with the multi-day plan flow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::NaiveDate;
use mealmate_core::models::MealType;
use mealmate_intelligence::{
    fallback_day_plan, meal_calorie_target, rank_for_meal, validate_day_plan, DayPlan,
    PlanViolation, ProposedMeal, ScoredDish,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::context::{candidates_json, UserContext};
use super::{parse_response, FlowError, FlowResult, FlowRunner};
use crate::llm::prompts::{render, system_prompt, DAY_PLAN_TEMPLATE};
use crate::llm::ChatMessage;

/// Day-plan payload
#[derive(Debug, Clone, Serialize)]
pub struct DayPlanSuggestion {
    /// Daily calorie target the plan was built for
    pub calorie_target: u32,
    /// The plan
    pub plan: DayPlan,
}

#[derive(Deserialize)]
struct ModelDay {
    #[serde(default)]
    meals: Vec<ProposedMeal>,
    #[serde(default)]
    notes: Option<String>,
}

/// Ranked candidates for every slot, each scored against the slot's calorie share
pub(super) fn slot_candidates(
    ctx: &UserContext,
    daily_target: u32,
    per_slot: usize,
) -> Vec<(MealType, Vec<ScoredDish>)> {
    MealType::ALL
        .into_iter()
        .map(|meal_type| {
            let scoring = ctx
                .scoring()
                .with_calorie_target(Some(meal_calorie_target(daily_target, meal_type)));
            let mut ranked = rank_for_meal(&ctx.catalogue, &scoring, meal_type);
            ranked.truncate(per_slot);
            (meal_type, ranked)
        })
        .collect()
}

/// Prompt section listing candidates per slot
pub(super) fn slot_candidates_prompt(slots: &[(MealType, Vec<ScoredDish>)]) -> String {
    slots
        .iter()
        .map(|(meal_type, candidates)| {
            format!(
                "{} candidates:\n{}",
                meal_type.as_str(),
                candidates_json(candidates)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Candidate count per slot derived from the flow's candidate budget
pub(super) fn per_slot_budget(max_candidates: usize) -> usize {
    (max_candidates / MealType::ALL.len()).max(3)
}

pub(super) fn violation_messages(violations: &[PlanViolation]) -> Vec<String> {
    violations.iter().map(ToString::to_string).collect()
}

impl FlowRunner {
    /// Plan one day of meals around `daily_target`
    ///
    /// The fallback leaves out slots with no eligible dish.
    pub async fn suggest_day_plan(
        &self,
        ctx: &UserContext,
        date: NaiveDate,
        daily_target: u32,
        rng: &mut (impl Rng + Send),
    ) -> FlowResult<DayPlanSuggestion> {
        let per_slot = per_slot_budget(self.config().max_candidates);
        let slots = slot_candidates(ctx, daily_target, per_slot);

        let attempts = if slots.iter().all(|(_, c)| c.is_empty()) {
            0
        } else {
            let task = render(
                DAY_PLAN_TEMPLATE,
                &[("calorie_target", daily_target.to_string())],
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
                .run("day_plan", messages, |value: Value| {
                    let day: ModelDay = parse_response(value)?;
                    validate_day_plan(&day.meals, day.notes, &ctx.catalogue, daily_target, date)
                        .map_err(|v| FlowError::Validation(violation_messages(&v)))
                })
                .await;

            if let Some(plan) = plan {
                return FlowResult::ai(
                    attempts,
                    DayPlanSuggestion {
                        calorie_target: daily_target,
                        plan,
                    },
                );
            }
            attempts
        };

        let plan = fallback_day_plan(&ctx.catalogue, &ctx.scoring(), daily_target, date, rng);
        FlowResult::fallback(
            attempts,
            DayPlanSuggestion {
                calorie_target: daily_target,
                plan,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_slot_budget_has_a_floor() {
        assert_eq!(per_slot_budget(20), 5);
        assert_eq!(per_slot_budget(4), 3);
        assert_eq!(per_slot_budget(0), 3);
    }
}
