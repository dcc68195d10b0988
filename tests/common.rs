// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: In-memory database, seeded catalogue, test configuration and user/token helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `mealmate`

use mealmate::auth::AuthManager;
use mealmate::config::{AuthConfig, Environment, FlowConfig, ServerConfig};
use mealmate::database::Database;
use mealmate::llm::LlmProvider;
use mealmate::models::{Dish, DishCategory, DishDraft, User, UserRole};
use mealmate::resources::ServerResources;
use mealmate::routes::build_router;
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// Secret shared by every test server
pub const TEST_JWT_SECRET: &[u8] = b"mealmate-test-secret-with-enough-entropy";

/// Email promoted to admin on registration
pub const ADMIN_EMAIL: &str = "chef@example.com";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Configuration used by every test server
pub fn test_config() -> ServerConfig {
    ServerConfig {
        environment: Environment::Testing,
        http_port: 0,
        database_url: "sqlite::memory:".to_owned(),
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_vec(),
            jwt_secret_generated: false,
            jwt_expiry_hours: 24,
            admin_email: Some(ADMIN_EMAIL.to_owned()),
        },
        default_calorie_target: 2000,
        flow: FlowConfig::default(),
        llm_provider: None,
    }
}

/// Fresh in-memory database with the schema applied
pub async fn create_test_database() -> Database {
    init_test_logging();
    Database::new("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database")
}

fn draft(name: &str, category: DishCategory, origin: &str, calories: u32, ingredients: &[&str]) -> DishDraft {
    DishDraft {
        name: name.to_owned(),
        category,
        origin: origin.to_owned(),
        calories,
        description: None,
        image_url: None,
        ingredients: ingredients.iter().map(|s| (*s).to_owned()).collect(),
        tags: Vec::new(),
        is_active: true,
    }
}

/// Catalogue covering every meal slot
///
/// A plan of Overnight Oats, Bun Cha, Pho Bo and Edamame totals 1790 kcal.
pub fn catalogue_drafts() -> Vec<DishDraft> {
    vec![
        draft("Overnight Oats", DishCategory::Breakfast, "american", 400, &["oats", "milk", "berries"]),
        draft("Shakshuka", DishCategory::Breakfast, "middle eastern", 450, &["eggs", "tomato", "onion"]),
        draft("Pho Bo", DishCategory::Soup, "vietnamese", 550, &["beef", "rice noodles", "ginger"]),
        draft("Bun Cha", DishCategory::MainCourse, "vietnamese", 650, &["pork", "rice noodles", "lettuce"]),
        draft("Chicken Teriyaki Bowl", DishCategory::MainCourse, "japanese", 600, &["chicken", "rice", "broccoli"]),
        draft("Greek Salad", DishCategory::Salad, "greek", 350, &["tomato", "cucumber", "feta"]),
        draft("Edamame", DishCategory::Snack, "japanese", 190, &["edamame", "salt"]),
        draft("Mango Lassi", DishCategory::Drink, "indian", 220, &["mango", "yogurt", "milk"]),
    ]
}

/// Insert the test catalogue
pub async fn seed_catalogue(database: &Database) -> Vec<Dish> {
    let dishes = database.dishes();
    let mut created = Vec::new();
    for draft in catalogue_drafts() {
        created.push(dishes.create(draft).await.expect("Failed to seed dish"));
    }
    created
}

/// Look up a seeded dish by name
pub fn dish<'a>(catalogue: &'a [Dish], name: &str) -> &'a Dish {
    catalogue
        .iter()
        .find(|d| d.name == name)
        .unwrap_or_else(|| panic!("dish {name} not seeded"))
}

/// Test server state over a fresh seeded database
pub struct TestApp {
    pub resources: Arc<ServerResources>,
    pub catalogue: Vec<Dish>,
}

impl TestApp {
    /// Server without a language model
    pub async fn new() -> Self {
        Self::with_provider(None).await
    }

    /// Server backed by `provider`
    pub async fn with_provider(provider: Option<Arc<dyn LlmProvider>>) -> Self {
        let database = create_test_database().await;
        let catalogue = seed_catalogue(&database).await;
        let resources = Arc::new(ServerResources::new(
            database,
            Arc::new(test_config()),
            provider,
        ));
        Self {
            resources,
            catalogue,
        }
    }

    /// Full application router
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.resources))
    }

    /// Insert a user directly and return it with a valid token
    pub async fn create_user(&self, email: &str, role: UserRole) -> (User, String) {
        let mut user = User::new(email, "not-a-real-hash".to_owned(), None);
        user.role = role;
        self.resources
            .database
            .users()
            .create(&user)
            .await
            .expect("Failed to create user");
        let token = self
            .resources
            .auth
            .generate_token(&user)
            .expect("Failed to sign token");
        (user, token)
    }

    /// A regular user and token
    pub async fn user(&self) -> (User, String) {
        self.create_user("cook@example.com", UserRole::User).await
    }

    /// An admin and token
    pub async fn admin(&self) -> (User, String) {
        self.create_user("admin@example.com", UserRole::Admin).await
    }
}

/// Auth manager signing with the test secret
pub fn test_auth_manager() -> AuthManager {
    AuthManager::new(TEST_JWT_SECRET, 24)
}
