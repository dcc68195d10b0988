// ABOUTME: Prompt templates for the suggestion flows, loaded at compile time
// ABOUTME: Markdown templates with {placeholder} substitution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! # Prompts
//!
//! Each flow sends [`COACH_SYSTEM_PROMPT`] followed by its task template.
//! Templates live next to this file as markdown so they can be edited
//! without touching code.

/// Shared coaching persona and output rules
pub const COACH_SYSTEM_PROMPT: &str = include_str!("coach_system.md");

/// `{limit}`
pub const RECOMMEND_DISHES_TEMPLATE: &str = include_str!("recommend_dishes.md");

/// `{meal_type}`, `{calorie_target}`
pub const SINGLE_MEAL_TEMPLATE: &str = include_str!("single_meal.md");

/// `{calorie_target}`
pub const DAY_PLAN_TEMPLATE: &str = include_str!("day_plan.md");

/// `{days}`, `{calorie_target}`
pub const MEAL_PLAN_TEMPLATE: &str = include_str!("meal_plan.md");

/// No placeholders
pub const FRIDGE_RECIPE_TEMPLATE: &str = include_str!("fridge_recipe.md");

/// Substitute `{key}` placeholders in `template`
#[must_use]
pub fn render(template: &str, values: &[(&str, String)]) -> String {
    values
        .iter()
        .fold(template.to_owned(), |acc, (key, value)| {
            acc.replace(&format!("{{{key}}}"), value)
        })
}

/// System prompt for a flow: persona plus task instructions
#[must_use]
pub fn system_prompt(task: &str) -> String {
    format!("{}\n\n{}", COACH_SYSTEM_PROMPT.trim_end(), task.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_every_occurrence() {
        let text = render(MEAL_PLAN_TEMPLATE, &[
            ("days", "3".to_owned()),
            ("calorie_target", "1800".to_owned()),
        ]);
        assert!(text.contains("plan 3 consecutive days"));
        assert!(text.contains("1800 kcal"));
        assert!(!text.contains("{days}"));
    }

    #[test]
    fn test_system_prompt_includes_persona() {
        let prompt = system_prompt(FRIDGE_RECIPE_TEMPLATE);
        assert!(prompt.starts_with("You are Mealmate"));
        assert!(prompt.contains("estimated_calories"));
    }
}
