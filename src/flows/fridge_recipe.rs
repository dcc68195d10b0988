// ABOUTME: Fridge-recipe flow inventing a recipe from the user's fridge, expiring items first
// ABOUTME: Falls back to the best fridge-matching catalogue dish or a generic pantry bowl
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use mealmate_core::constants::limits::{DEFAULT_EXPIRING_DAYS, MAX_DISH_CALORIES};
use mealmate_core::models::FridgeItem;
use mealmate_intelligence::fridge_match;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::context::UserContext;
use super::{parse_response, FlowError, FlowResult, FlowRunner};
use crate::errors::{AppError, AppResult};
use crate::llm::prompts::{system_prompt, FRIDGE_RECIPE_TEMPLATE};
use crate::llm::ChatMessage;

/// Calories assumed for the generic pantry bowl
const PANTRY_BOWL_CALORIES: u32 = 550;

const GENERIC_STEPS: [&str; 4] = [
    "Wash and prepare all ingredients, cutting them into bite-sized pieces.",
    "Cook the ingredients that need the longest first, then add the rest.",
    "Season to taste with salt, pepper and your favourite spices.",
    "Plate while hot and enjoy.",
];

/// One recipe ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredient {
    /// Ingredient name
    pub name: String,
    /// Free-text amount
    pub quantity: Option<String>,
    /// Whether it is in the user's fridge
    pub from_fridge: bool,
}

/// Recipe payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    /// Recipe name
    pub title: String,
    /// Ingredients
    pub ingredients: Vec<RecipeIngredient>,
    /// Preparation steps
    pub steps: Vec<String>,
    /// Calories per serving
    pub estimated_calories: u32,
    /// Catalogue dish the recipe is based on, for fallbacks
    pub based_on_dish_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct ModelRecipe {
    #[serde(default)]
    title: String,
    #[serde(default)]
    ingredients: Vec<ModelIngredient>,
    #[serde(default)]
    steps: Vec<String>,
    #[serde(default)]
    estimated_calories: u32,
}

#[derive(Deserialize)]
struct ModelIngredient {
    name: String,
    #[serde(default)]
    quantity: Option<Value>,
}

fn quantity_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.trim().to_owned()).filter(|t| !t.is_empty()),
        other => Some(other.to_string()),
    }
}

fn in_fridge(name: &str, fridge: &[FridgeItem]) -> bool {
    let needle = name.trim().to_lowercase();
    !needle.is_empty()
        && fridge.iter().any(|item| {
            let stock = item.name.trim().to_lowercase();
            !stock.is_empty() && (stock.contains(&needle) || needle.contains(&stock))
        })
}

fn validate_recipe(value: Value, fridge: &[FridgeItem]) -> Result<Recipe, FlowError> {
    let recipe: ModelRecipe = parse_response(value)?;
    let mut violations = Vec::new();

    let title = recipe.title.trim().to_owned();
    if title.is_empty() {
        violations.push("title must not be empty".to_owned());
    }

    let ingredients: Vec<RecipeIngredient> = recipe
        .ingredients
        .into_iter()
        .filter(|i| !i.name.trim().is_empty())
        .map(|i| RecipeIngredient {
            from_fridge: in_fridge(&i.name, fridge),
            name: i.name.trim().to_owned(),
            quantity: quantity_text(i.quantity),
        })
        .collect();
    if ingredients.is_empty() {
        violations.push("at least one ingredient is required".to_owned());
    } else if !ingredients.iter().any(|i| i.from_fridge) {
        violations.push("at least one ingredient must come from the fridge".to_owned());
    }

    let steps: Vec<String> = recipe
        .steps
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect();
    if steps.is_empty() {
        violations.push("at least one step is required".to_owned());
    }

    if !(1..=MAX_DISH_CALORIES).contains(&recipe.estimated_calories) {
        violations.push(format!(
            "estimated_calories must be between 1 and {MAX_DISH_CALORIES}"
        ));
    }

    if !violations.is_empty() {
        return Err(FlowError::Validation(violations));
    }
    Ok(Recipe {
        title,
        ingredients,
        steps,
        estimated_calories: recipe.estimated_calories,
        based_on_dish_id: None,
    })
}

fn fallback_recipe(ctx: &UserContext) -> Recipe {
    let names = ctx.fridge_names();
    let best = ctx
        .catalogue
        .iter()
        .map(|dish| (dish, fridge_match(dish, &names)))
        .filter(|(_, matched)| *matched > 0.0)
        .max_by(|a, b| {
            a.1.total_cmp(&b.1)
                .then_with(|| b.0.name.to_lowercase().cmp(&a.0.name.to_lowercase()))
        });

    let steps = GENERIC_STEPS.iter().map(|s| (*s).to_owned()).collect();

    if let Some((dish, _)) = best {
        return Recipe {
            title: dish.name.clone(),
            ingredients: dish
                .ingredients
                .iter()
                .map(|name| RecipeIngredient {
                    name: name.clone(),
                    quantity: None,
                    from_fridge: in_fridge(name, &ctx.fridge),
                })
                .collect(),
            steps,
            estimated_calories: dish.calories,
            based_on_dish_id: Some(dish.id),
        };
    }

    Recipe {
        title: "Fridge pantry bowl".to_owned(),
        ingredients: ctx
            .fridge
            .iter()
            .map(|item| RecipeIngredient {
                name: item.name.clone(),
                quantity: Some(format!("{} {}", item.quantity, item.unit)),
                from_fridge: true,
            })
            .collect(),
        steps,
        estimated_calories: PANTRY_BOWL_CALORIES,
        based_on_dish_id: None,
    }
}

fn fridge_prompt(ctx: &UserContext) -> String {
    let (mut expiring, mut rest): (Vec<&FridgeItem>, Vec<&FridgeItem>) = ctx
        .fridge
        .iter()
        .partition(|item| item.is_expiring(ctx.today, DEFAULT_EXPIRING_DAYS));
    expiring.sort_by_key(|item| item.expires_on);
    rest.sort_by(|a, b| a.name.cmp(&b.name));

    let line = |item: &&FridgeItem, expiring: bool| {
        let mut text = format!("- {}: {} {}", item.name, item.quantity, item.unit);
        if expiring {
            text.push_str(" (expiring)");
        }
        text
    };

    expiring
        .iter()
        .map(|item| line(item, true))
        .chain(rest.iter().map(|item| line(item, false)))
        .collect::<Vec<_>>()
        .join("\n")
}

impl FlowRunner {
    /// Invent a recipe from the user's fridge
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the fridge is empty
    pub async fn suggest_fridge_recipe(&self, ctx: &UserContext) -> AppResult<FlowResult<Recipe>> {
        if ctx.fridge.is_empty() {
            return Err(AppError::invalid_input(
                "Add items to your fridge before asking for a recipe",
            ));
        }

        let messages = vec![
            ChatMessage::system(system_prompt(FRIDGE_RECIPE_TEMPLATE)),
            ChatMessage::user(format!(
                "{}\nFridge contents:\n{}",
                ctx.user_summary(None),
                fridge_prompt(ctx)
            )),
        ];

        let (recipe, attempts) = self
            .run("fridge_recipe", messages, |value| {
                validate_recipe(value, &ctx.fridge)
            })
            .await;

        Ok(match recipe {
            Some(recipe) => FlowResult::ai(attempts, recipe),
            None => FlowResult::fallback(attempts, fallback_recipe(ctx)),
        })
    }
}
