// ABOUTME: Daily calorie targets and per-meal budgets from a user's body metrics
// ABOUTME: Mifflin-St Jeor BMR, activity-based TDEE, goal adjustment and daily intake summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! # Nutrition
//!
//! - Mifflin, M.D., et al. (1990). A new predictive equation for resting energy expenditure.
//!   *American Journal of Clinical Nutrition*, 51(2), 241-247.
//!
//! Activity factors follow `McArdle` et al. (2010).

use mealmate_core::constants::nutrition::MIN_DAILY_CALORIES;
use mealmate_core::errors::{AppError, AppResult};
use mealmate_core::models::{ActivityLevel, MealLog, MealType, NutritionGoal, NutritionProfile, Sex};
use serde::Serialize;
use std::collections::BTreeMap;

/// Floor applied to any computed BMR
const MIN_BMR: f64 = 1000.0;

/// Basal Metabolic Rate using Mifflin-St Jeor
///
/// `BMR = 10·kg + 6.25·cm − 5·age + (5 | −161)`
///
/// # Errors
///
/// Returns an error if weight, height or age are out of range
pub fn basal_metabolic_rate(weight_kg: f64, height_cm: f64, age: u32, sex: Sex) -> AppResult<f64> {
    if weight_kg <= 0.0 || weight_kg > 300.0 {
        return Err(AppError::invalid_input("Weight must be between 0 and 300 kg"));
    }
    if height_cm <= 0.0 || height_cm > 300.0 {
        return Err(AppError::invalid_input("Height must be between 0 and 300 cm"));
    }
    if !(10..=120).contains(&age) {
        return Err(AppError::invalid_input("Age must be between 10 and 120 years"));
    }

    let sex_constant = match sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    let bmr = 6.25f64.mul_add(height_cm, 10.0 * weight_kg) - 5.0 * f64::from(age) + sex_constant;
    Ok(bmr.max(MIN_BMR))
}

/// Multiplier from BMR to total daily energy expenditure
#[must_use]
pub const fn activity_factor(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::LightlyActive => 1.375,
        ActivityLevel::ModeratelyActive => 1.55,
        ActivityLevel::VeryActive => 1.725,
        ActivityLevel::ExtraActive => 1.9,
    }
}

/// kcal added to TDEE for a weight goal
#[must_use]
pub const fn goal_adjustment(goal: NutritionGoal) -> f64 {
    match goal {
        NutritionGoal::LoseWeight => -500.0,
        NutritionGoal::Maintain => 0.0,
        NutritionGoal::GainWeight => 300.0,
    }
}

/// Daily calorie target for a nutrition profile, rounded to the nearest kcal
///
/// # Errors
///
/// Returns an error if the profile's body metrics are out of range
pub fn daily_calorie_target(profile: &NutritionProfile) -> AppResult<u32> {
    let bmr = basal_metabolic_rate(profile.weight_kg, profile.height_cm, profile.age, profile.sex)?;
    let tdee = bmr * activity_factor(profile.activity_level);
    let target = (tdee + goal_adjustment(profile.goal)).max(MIN_DAILY_CALORIES);
    // bounded above by 300 kg / 300 cm inputs, far below u32::MAX
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(target.round() as u32)
}

/// Calorie budget for one meal slot
#[must_use]
pub fn meal_calorie_target(day_target: u32, meal_type: MealType) -> u32 {
    let share = u64::from(day_target) * u64::from(meal_type.calorie_share_percent());
    // share / 100 never exceeds day_target
    u32::try_from((share + 50) / 100).unwrap_or(day_target)
}

/// Calories consumed in one day against a target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    /// Target used
    pub target_calories: u32,
    /// Sum of logged calories
    pub total_calories: u32,
    /// Logged calories per meal slot
    pub by_meal_type: BTreeMap<MealType, u32>,
    /// `target - total`, negative when over target
    pub remaining_calories: i64,
    /// `total / target` (0 when the target is 0)
    pub share_consumed: f64,
    /// Number of log entries
    pub entries: usize,
}

/// Summarize a day's meal logs against `target`
#[must_use]
pub fn daily_summary(logs: &[MealLog], target: u32) -> DailySummary {
    let mut by_meal_type: BTreeMap<MealType, u32> =
        MealType::ALL.into_iter().map(|m| (m, 0)).collect();
    let mut total: u32 = 0;
    for log in logs {
        total = total.saturating_add(log.calories);
        let slot = by_meal_type.entry(log.meal_type).or_insert(0);
        *slot = slot.saturating_add(log.calories);
    }

    let share_consumed = if target == 0 {
        0.0
    } else {
        f64::from(total) / f64::from(target)
    };

    DailySummary {
        target_calories: target,
        total_calories: total,
        by_meal_type,
        remaining_calories: i64::from(target) - i64::from(total),
        share_consumed,
        entries: logs.len(),
    }
}
