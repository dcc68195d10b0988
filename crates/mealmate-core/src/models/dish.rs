// ABOUTME: Dish catalogue model curated by administrators
// ABOUTME: Defines Dish, DishCategory, MealType and the slot/category compatibility table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::constants::limits::MAX_DISH_CALORIES;
use crate::errors::{AppError, AppResult};

/// Category of a dish in the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DishCategory {
    /// Morning dishes (porridge, eggs, pastries)
    Breakfast,
    /// Main plates for lunch or dinner
    MainCourse,
    /// Soups and broths
    Soup,
    /// Salads and bowls
    Salad,
    /// Small bites between meals
    Snack,
    /// Sweet courses
    Dessert,
    /// Beverages and smoothies
    Drink,
    /// Side dishes that accompany a main
    Side,
}

impl DishCategory {
    /// All categories in declaration order
    pub const ALL: [Self; 8] = [
        Self::Breakfast,
        Self::MainCourse,
        Self::Soup,
        Self::Salad,
        Self::Snack,
        Self::Dessert,
        Self::Drink,
        Self::Side,
    ];

    /// Stable string form used in storage and prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::MainCourse => "main_course",
            Self::Soup => "soup",
            Self::Salad => "salad",
            Self::Snack => "snack",
            Self::Dessert => "dessert",
            Self::Drink => "drink",
            Self::Side => "side",
        }
    }

    /// Parse from the stable string form
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a known category
    pub fn parse(value: &str) -> AppResult<Self> {
        let normalized = value.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| AppError::invalid_input(format!("Unknown dish category: {value}")))
    }
}

impl fmt::Display for DishCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meal slot within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    /// First meal of the day
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    Dinner,
    /// Snack between meals
    Snack,
}

impl MealType {
    /// All meal types in the order they appear in a day
    pub const ALL: [Self; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Snack];

    /// Stable string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    /// Parse from the stable string form
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a known meal type
    pub fn parse(value: &str) -> AppResult<Self> {
        let normalized = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| AppError::invalid_input(format!("Unknown meal type: {value}")))
    }

    /// Dish categories that may fill this slot
    #[must_use]
    pub const fn accepted_categories(&self) -> &'static [DishCategory] {
        match self {
            Self::Breakfast => &[DishCategory::Breakfast, DishCategory::Drink, DishCategory::Side],
            Self::Lunch | Self::Dinner => &[
                DishCategory::MainCourse,
                DishCategory::Soup,
                DishCategory::Salad,
                DishCategory::Side,
            ],
            Self::Snack => &[DishCategory::Snack, DishCategory::Dessert, DishCategory::Drink],
        }
    }

    /// Whether a dish of `category` may fill this slot
    #[must_use]
    pub fn accepts(&self, category: DishCategory) -> bool {
        self.accepted_categories().contains(&category)
    }

    /// Share of the daily calorie target allotted to this slot, in percent
    #[must_use]
    pub const fn calorie_share_percent(&self) -> u32 {
        match self {
            Self::Breakfast => 25,
            Self::Lunch => 35,
            Self::Dinner => 30,
            Self::Snack => 10,
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dish in the curated catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    /// Unique identifier
    pub id: Uuid,
    /// Display name, unique case-insensitively
    pub name: String,
    /// Dish category
    pub category: DishCategory,
    /// Cuisine origin, lower-case
    pub origin: String,
    /// Calories per serving (kcal)
    pub calories: u32,
    /// Optional description
    pub description: Option<String>,
    /// Optional image URL
    pub image_url: Option<String>,
    /// Ingredient names
    pub ingredients: Vec<String>,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Inactive dishes are hidden from users and recommendations
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Dish {
    /// Normalize a cuisine origin for storage and comparison
    #[must_use]
    pub fn normalize_origin(origin: &str) -> String {
        origin.trim().to_lowercase()
    }

    /// Case-insensitive name comparison
    #[must_use]
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

/// Fields required to create a dish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishDraft {
    /// Display name
    pub name: String,
    /// Dish category
    pub category: DishCategory,
    /// Cuisine origin
    pub origin: String,
    /// Calories per serving
    pub calories: u32,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Optional image URL
    #[serde(default)]
    pub image_url: Option<String>,
    /// Ingredient names
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Active flag (defaults to true)
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl DishDraft {
    /// Validate draft fields
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, the origin is empty, or calories
    /// are outside `1..=MAX_DISH_CALORIES`
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_input("Dish name must not be empty"));
        }
        if self.origin.trim().is_empty() {
            return Err(AppError::invalid_input("Dish origin must not be empty"));
        }
        validate_calories(self.calories)
    }
}

/// Partial update for a dish
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DishUpdate {
    /// New name
    pub name: Option<String>,
    /// New category
    pub category: Option<DishCategory>,
    /// New origin
    pub origin: Option<String>,
    /// New calories
    pub calories: Option<u32>,
    /// New description
    pub description: Option<String>,
    /// New image URL
    pub image_url: Option<String>,
    /// New ingredients
    pub ingredients: Option<Vec<String>>,
    /// New tags
    pub tags: Option<Vec<String>>,
    /// New active flag
    pub is_active: Option<bool>,
}

impl DishUpdate {
    /// Apply this update onto an existing dish
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting dish would be invalid
    pub fn apply(self, dish: &mut Dish, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(AppError::invalid_input("Dish name must not be empty"));
            }
            dish.name = name.trim().to_owned();
        }
        if let Some(category) = self.category {
            dish.category = category;
        }
        if let Some(origin) = self.origin {
            if origin.trim().is_empty() {
                return Err(AppError::invalid_input("Dish origin must not be empty"));
            }
            dish.origin = Dish::normalize_origin(&origin);
        }
        if let Some(calories) = self.calories {
            validate_calories(calories)?;
            dish.calories = calories;
        }
        if self.description.is_some() {
            dish.description = self.description;
        }
        if self.image_url.is_some() {
            dish.image_url = self.image_url;
        }
        if let Some(ingredients) = self.ingredients {
            dish.ingredients = ingredients;
        }
        if let Some(tags) = self.tags {
            dish.tags = tags;
        }
        if let Some(is_active) = self.is_active {
            dish.is_active = is_active;
        }
        dish.updated_at = now;
        Ok(())
    }
}

fn validate_calories(calories: u32) -> AppResult<()> {
    if calories == 0 || calories > MAX_DISH_CALORIES {
        return Err(AppError::out_of_range(format!(
            "Calories must be between 1 and {MAX_DISH_CALORIES}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_accepts_loose_forms() {
        assert_eq!(DishCategory::parse("Main Course").ok(), Some(DishCategory::MainCourse));
        assert_eq!(DishCategory::parse("main-course").ok(), Some(DishCategory::MainCourse));
        assert!(DishCategory::parse("brunch").is_err());
    }

    #[test]
    fn test_meal_type_slot_rules() {
        assert!(MealType::Breakfast.accepts(DishCategory::Drink));
        assert!(!MealType::Breakfast.accepts(DishCategory::MainCourse));
        assert!(MealType::Dinner.accepts(DishCategory::Soup));
        assert!(MealType::Snack.accepts(DishCategory::Dessert));

        let total: u32 = MealType::ALL.iter().map(MealType::calorie_share_percent).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_draft_rejects_zero_calories() {
        let draft = DishDraft {
            name: "Pho".to_owned(),
            category: DishCategory::Soup,
            origin: "vietnamese".to_owned(),
            calories: 0,
            description: None,
            image_url: None,
            ingredients: vec![],
            tags: vec![],
            is_active: true,
        };
        assert!(draft.validate().is_err());
    }
}
