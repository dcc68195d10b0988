// ABOUTME: Meal recommendation engine: scoring, taste profiles, nutrition and plan validation
// ABOUTME: Deterministic algorithms with injected randomness for fallback selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

#![deny(unsafe_code)]

//! # Mealmate Intelligence
//!
//! The heuristics behind every suggestion the server makes:
//!
//! - [`profile`]: folds interaction events into a [`VirtualProfile`](mealmate_core::models::VirtualProfile)
//! - [`scoring`]: ranks catalogue dishes for a user
//! - [`nutrition`]: daily calorie targets and intake summaries
//! - [`plans`]: day and multi-day plan structures, validation and fallback builders
//!
//! Nothing here performs IO. Randomness is always passed in as `&mut impl Rng`.

/// Daily calorie targets and intake summaries
pub mod nutrition;
/// Day and multi-day meal plans
pub mod plans;
/// Virtual profile updates
pub mod profile;
/// Dish scoring heuristic
pub mod scoring;

pub use nutrition::{daily_calorie_target, daily_summary, meal_calorie_target, DailySummary};
pub use plans::{
    choose_random_top, fallback_day_plan, fallback_meal_plan, validate_day_plan,
    validate_meal_plan, DayPlan, MealPlan, PlanViolation, PlannedMeal, ProposedDay, ProposedMeal,
};
pub use profile::{apply_interaction, top_origins};
pub use scoring::{
    fridge_match, heuristic_reason, rank_dishes, rank_for_meal, score_dish, ScoreBreakdown,
    ScoredDish, ScoringContext,
};
