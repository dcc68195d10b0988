// ABOUTME: User account model with role and optional nutrition profile
// ABOUTME: Nutrition profile feeds the daily calorie target used by meal planning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user
    #[default]
    User,
    /// Content administrator
    Admin,
}

impl UserRole {
    /// Stable string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse with fallback to `User`
    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        if value.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }

    /// Whether this role may manage content
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Biological sex for BMR calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Male
    Male,
    /// Female
    Female,
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Exercise 1-3 days/week
    LightlyActive,
    /// Exercise 3-5 days/week
    ModeratelyActive,
    /// Exercise 6-7 days/week
    VeryActive,
    /// Hard training twice a day
    ExtraActive,
}

/// Weight goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NutritionGoal {
    /// Caloric deficit
    LoseWeight,
    /// Caloric balance
    #[default]
    Maintain,
    /// Caloric surplus
    GainWeight,
}

/// Body metrics used to compute a daily calorie target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionProfile {
    /// Biological sex
    pub sex: Sex,
    /// Age in years
    pub age: u32,
    /// Height in centimeters
    pub height_cm: f64,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Activity level
    pub activity_level: ActivityLevel,
    /// Weight goal
    #[serde(default)]
    pub goal: NutritionGoal,
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Email address, lower-case
    pub email: String,
    /// bcrypt hash of the password
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Display name
    pub display_name: Option<String>,
    /// Role
    pub role: UserRole,
    /// Optional nutrition profile
    pub nutrition: Option<NutritionProfile>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh id
    #[must_use]
    pub fn new(email: &str, password_hash: String, display_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            password_hash,
            display_name,
            role: UserRole::User,
            nutrition: None,
            created_at: Utc::now(),
        }
    }
}
