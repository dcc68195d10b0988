// ABOUTME: Dish catalogue seeding utility for the Mealmate server
// ABOUTME: Inserts a starter set of dishes across every category and several cuisines
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! Starter catalogue seeder.
//!
//! Usage:
//! ```bash
//! # Seed dishes (uses DATABASE_URL from environment)
//! cargo run --bin seed-dishes
//!
//! # Override database URL
//! cargo run --bin seed-dishes -- --database-url sqlite:./data/mealmate.db
//!
//! # Overwrite dishes that already exist with the seed values
//! cargo run --bin seed-dishes -- --force
//! ```

use anyhow::Result;
use clap::Parser;
use mealmate::config::env_keys;
use mealmate::database::{Database, DishesManager};
use mealmate::models::{DishCategory, DishDraft, DishUpdate};
use std::env;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "seed-dishes",
    about = "Mealmate Dish Catalogue Seeder",
    long_about = "Create the starter dish catalogue used by recommendations and meal plans"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Overwrite existing dishes with the seed values
    #[arg(long)]
    force: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Seed dish definition
struct SeedDish {
    name: &'static str,
    category: DishCategory,
    origin: &'static str,
    calories: u32,
    description: &'static str,
    ingredients: &'static [&'static str],
    tags: &'static [&'static str],
}

impl SeedDish {
    fn draft(&self) -> DishDraft {
        DishDraft {
            name: self.name.to_owned(),
            category: self.category,
            origin: self.origin.to_owned(),
            calories: self.calories,
            description: Some(self.description.to_owned()),
            image_url: None,
            ingredients: self.ingredients.iter().map(|s| (*s).to_owned()).collect(),
            tags: self.tags.iter().map(|s| (*s).to_owned()).collect(),
            is_active: true,
        }
    }

    fn update(&self) -> DishUpdate {
        let draft = self.draft();
        DishUpdate {
            name: Some(draft.name),
            category: Some(draft.category),
            origin: Some(draft.origin),
            calories: Some(draft.calories),
            description: draft.description,
            image_url: None,
            ingredients: Some(draft.ingredients),
            tags: Some(draft.tags),
            is_active: Some(true),
        }
    }
}

const SEED_DISHES: &[SeedDish] = &[
    // Breakfast
    SeedDish {
        name: "Overnight Oats",
        category: DishCategory::Breakfast,
        origin: "american",
        calories: 380,
        description: "Rolled oats soaked in milk with berries and honey",
        ingredients: &["oats", "milk", "berries", "honey"],
        tags: &["vegetarian", "make-ahead"],
    },
    SeedDish {
        name: "Shakshuka",
        category: DishCategory::Breakfast,
        origin: "middle eastern",
        calories: 420,
        description: "Eggs poached in a spiced tomato and pepper sauce",
        ingredients: &["eggs", "tomato", "bell pepper", "onion", "cumin"],
        tags: &["vegetarian"],
    },
    SeedDish {
        name: "Banh Mi Op La",
        category: DishCategory::Breakfast,
        origin: "vietnamese",
        calories: 510,
        description: "Fried eggs with baguette, pate and pickled vegetables",
        ingredients: &["eggs", "baguette", "pickled carrot", "cilantro"],
        tags: &[],
    },
    SeedDish {
        name: "Tamagoyaki",
        category: DishCategory::Breakfast,
        origin: "japanese",
        calories: 260,
        description: "Rolled sweet omelette",
        ingredients: &["eggs", "soy sauce", "mirin", "sugar"],
        tags: &["vegetarian", "high-protein"],
    },
    // Mains
    SeedDish {
        name: "Pho Bo",
        category: DishCategory::Soup,
        origin: "vietnamese",
        calories: 550,
        description: "Beef noodle soup with star anise broth and fresh herbs",
        ingredients: &["beef", "rice noodles", "onion", "ginger", "star anise", "basil"],
        tags: &[],
    },
    SeedDish {
        name: "Bun Cha",
        category: DishCategory::MainCourse,
        origin: "vietnamese",
        calories: 620,
        description: "Grilled pork with rice vermicelli and dipping sauce",
        ingredients: &["pork", "rice noodles", "fish sauce", "lettuce", "garlic"],
        tags: &[],
    },
    SeedDish {
        name: "Chicken Teriyaki Bowl",
        category: DishCategory::MainCourse,
        origin: "japanese",
        calories: 680,
        description: "Glazed chicken thigh over rice with steamed broccoli",
        ingredients: &["chicken", "rice", "soy sauce", "broccoli", "ginger"],
        tags: &["high-protein"],
    },
    SeedDish {
        name: "Spaghetti Aglio e Olio",
        category: DishCategory::MainCourse,
        origin: "italian",
        calories: 590,
        description: "Spaghetti tossed with garlic, olive oil and chili flakes",
        ingredients: &["spaghetti", "garlic", "olive oil", "chili", "parsley"],
        tags: &["vegetarian", "quick"],
    },
    SeedDish {
        name: "Minestrone",
        category: DishCategory::Soup,
        origin: "italian",
        calories: 320,
        description: "Vegetable and bean soup with small pasta",
        ingredients: &["tomato", "carrot", "celery", "beans", "pasta", "zucchini"],
        tags: &["vegetarian"],
    },
    SeedDish {
        name: "Chicken Tikka Masala",
        category: DishCategory::MainCourse,
        origin: "indian",
        calories: 710,
        description: "Charred chicken in a creamy spiced tomato sauce",
        ingredients: &["chicken", "yogurt", "tomato", "cream", "garam masala", "rice"],
        tags: &["high-protein"],
    },
    SeedDish {
        name: "Chana Masala",
        category: DishCategory::MainCourse,
        origin: "indian",
        calories: 480,
        description: "Chickpeas simmered with onion, tomato and spices",
        ingredients: &["chickpeas", "onion", "tomato", "ginger", "garlic"],
        tags: &["vegan"],
    },
    SeedDish {
        name: "Chicken Fajitas",
        category: DishCategory::MainCourse,
        origin: "mexican",
        calories: 640,
        description: "Sizzling chicken strips with peppers and tortillas",
        ingredients: &["chicken", "bell pepper", "onion", "tortilla", "lime"],
        tags: &["high-protein"],
    },
    SeedDish {
        name: "Greek Salad",
        category: DishCategory::Salad,
        origin: "greek",
        calories: 350,
        description: "Tomato, cucumber, olives and feta with oregano",
        ingredients: &["tomato", "cucumber", "olives", "feta", "red onion"],
        tags: &["vegetarian", "quick"],
    },
    SeedDish {
        name: "Goi Cuon",
        category: DishCategory::Side,
        origin: "vietnamese",
        calories: 240,
        description: "Fresh spring rolls with shrimp and herbs",
        ingredients: &["rice paper", "shrimp", "lettuce", "mint", "rice noodles"],
        tags: &["light"],
    },
    SeedDish {
        name: "Steamed Rice",
        category: DishCategory::Side,
        origin: "international",
        calories: 200,
        description: "Plain steamed jasmine rice",
        ingredients: &["rice"],
        tags: &["vegan"],
    },
    // Snacks, desserts and drinks
    SeedDish {
        name: "Hummus with Crudites",
        category: DishCategory::Snack,
        origin: "middle eastern",
        calories: 230,
        description: "Chickpea dip with raw carrot and cucumber sticks",
        ingredients: &["chickpeas", "tahini", "carrot", "cucumber", "lemon"],
        tags: &["vegan"],
    },
    SeedDish {
        name: "Edamame",
        category: DishCategory::Snack,
        origin: "japanese",
        calories: 190,
        description: "Steamed soybeans with sea salt",
        ingredients: &["edamame", "salt"],
        tags: &["vegan", "high-protein"],
    },
    SeedDish {
        name: "Che Ba Mau",
        category: DishCategory::Dessert,
        origin: "vietnamese",
        calories: 310,
        description: "Three-color dessert with beans, jelly and coconut milk",
        ingredients: &["mung beans", "red beans", "coconut milk", "pandan jelly"],
        tags: &["vegan"],
    },
    SeedDish {
        name: "Tiramisu",
        category: DishCategory::Dessert,
        origin: "italian",
        calories: 450,
        description: "Coffee-soaked ladyfingers layered with mascarpone",
        ingredients: &["ladyfingers", "mascarpone", "coffee", "eggs", "cocoa"],
        tags: &["vegetarian"],
    },
    SeedDish {
        name: "Mango Lassi",
        category: DishCategory::Drink,
        origin: "indian",
        calories: 220,
        description: "Blended yogurt drink with ripe mango",
        ingredients: &["mango", "yogurt", "milk", "cardamom"],
        tags: &["vegetarian"],
    },
    SeedDish {
        name: "Green Smoothie",
        category: DishCategory::Drink,
        origin: "american",
        calories: 180,
        description: "Spinach, banana and apple blended with water",
        ingredients: &["spinach", "banana", "apple"],
        tags: &["vegan", "light"],
    },
];

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    info!("=== Mealmate Dish Catalogue Seeder ===");

    let database_url = args
        .database_url
        .or_else(|| env::var(env_keys::DATABASE_URL).ok())
        .unwrap_or_else(|| "sqlite:./data/mealmate.db".into());

    info!("Connecting to database: {}", database_url);
    let database = Database::new(&database_url).await?;
    let dishes = database.dishes();

    info!("Seeding {} dishes...", SEED_DISHES.len());
    let report = seed_dishes(&dishes, args.force).await?;

    info!("");
    info!("=== Seeding Complete ===");
    info!(
        "Created {}, updated {}, skipped {}, failed {}",
        report.created, report.updated, report.skipped, report.failed
    );

    Ok(())
}

#[derive(Default)]
struct SeedReport {
    created: u32,
    updated: u32,
    skipped: u32,
    failed: u32,
}

async fn seed_dishes(dishes: &DishesManager, force: bool) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for seed in SEED_DISHES {
        match dishes.find_by_name(seed.name).await? {
            Some(existing) if force => match dishes.update(existing.id, seed.update()).await {
                Ok(_) => {
                    info!("  ↻ {}", seed.name);
                    report.updated += 1;
                }
                Err(e) => {
                    warn!("  ✗ {} - Error: {}", seed.name, e);
                    report.failed += 1;
                }
            },
            Some(_) => {
                info!("  - {} (exists, use --force to overwrite)", seed.name);
                report.skipped += 1;
            }
            None => match dishes.create(seed.draft()).await {
                Ok(_) => {
                    info!("  ✓ {}", seed.name);
                    report.created += 1;
                }
                Err(e) => {
                    warn!("  ✗ {} - Error: {}", seed.name, e);
                    report.failed += 1;
                }
            },
        }
    }

    Ok(report)
}
