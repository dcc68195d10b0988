// ABOUTME: Application-wide constants organized by domain
// ABOUTME: Limits, scoring weights, flow defaults and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

/// Input limits enforced at the model layer
pub mod limits {
    /// Upper bound on calories for a single dish or logged meal
    pub const MAX_DISH_CALORIES: u32 = 5000;
    /// Largest page of dish recommendations
    pub const MAX_RECOMMENDATIONS: usize = 20;
    /// Default page of dish recommendations
    pub const DEFAULT_RECOMMENDATIONS: usize = 5;
    /// Longest meal plan in days
    pub const MAX_PLAN_DAYS: u32 = 14;
    /// Default meal plan length in days
    pub const DEFAULT_PLAN_DAYS: u32 = 7;
    /// Minimum password length
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    /// Default look-ahead window for expiring fridge items
    pub const DEFAULT_EXPIRING_DAYS: u32 = 3;
}

/// Weights of the dish scoring heuristic
pub mod scoring {
    /// Weight applied to the squashed origin preference
    pub const ORIGIN_WEIGHT: f64 = 2.0;
    /// Weight applied to the squashed category preference
    pub const CATEGORY_WEIGHT: f64 = 1.5;
    /// Weight applied to the fridge ingredient match ratio
    pub const FRIDGE_WEIGHT: f64 = 1.0;
    /// Penalty for dishes eaten within the recency window
    pub const RECENT_PENALTY: f64 = 1.5;
    /// Bonus for dishes with a live promotion
    pub const PROMOTION_BONUS: f64 = 0.5;
    /// Half-saturation constant of the preference squash `s / (|s| + k)`
    pub const SQUASH_K: f64 = 5.0;
    /// Days a logged dish counts as recently eaten
    pub const RECENCY_DAYS: i64 = 3;
    /// Size of the pool random fallbacks draw from
    pub const FALLBACK_POOL: usize = 5;
}

/// Virtual profile update parameters
pub mod profile {
    /// Multiplicative decay applied to all scores before each interaction
    pub const DECAY: f64 = 0.98;
    /// Absolute bound on any single score
    pub const MAX_SCORE: f64 = 50.0;
    /// Scores below this magnitude are dropped
    pub const PRUNE_EPSILON: f64 = 0.01;
}

/// Calorie planning parameters
pub mod nutrition {
    /// Target used when neither the request nor the profile provides one
    pub const DEFAULT_DAILY_CALORIES: u32 = 2000;
    /// Floor on computed daily targets
    pub const MIN_DAILY_CALORIES: f64 = 1200.0;
    /// Allowed relative deviation of a day plan from its target
    pub const DAY_PLAN_TOLERANCE: f64 = 0.25;
}

/// Service identification for logs
pub mod service_names {
    /// Main server service name
    pub const MEALMATE_SERVER: &str = "mealmate-server";
}
