// ABOUTME: SQLite persistence layer with one manager per aggregate
// ABOUTME: Connection setup, idempotent schema migration and manager accessors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! # Database
//!
//! [`Database`] owns the `SqlitePool` and hands out lightweight managers that
//! each clone the pool:
//!
//! - [`UsersManager`]: accounts and nutrition profiles
//! - [`DishesManager`]: the curated catalogue
//! - [`MealLogManager`]: what users ate
//! - [`FridgeManager`]: virtual fridge inventory
//! - [`PromotionsManager`]: admin promotions
//! - [`NotificationsManager`]: broadcast and targeted notifications with read state
//! - [`ProfilesManager`]: virtual taste profiles
//!
//! Identifiers are stored as text, timestamps as fixed-width RFC 3339 UTC
//! strings (so they compare lexicographically) and lists/maps as JSON text.

mod dishes;
mod fridge;
mod meals;
mod notifications;
mod profiles;
mod promotions;
mod rows;
mod users;

pub use dishes::{DishFilter, DishesManager};
pub use fridge::FridgeManager;
pub use meals::MealLogManager;
pub use notifications::NotificationsManager;
pub use profiles::ProfilesManager;
pub use promotions::PromotionsManager;
pub use users::UsersManager;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};

const FILE_POOL_SIZE: u32 = 5;

/// Handle to the SQLite store
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to `database_url`, creating the file if needed, and migrate
    ///
    /// `sqlite::memory:` keeps a single connection alive for the pool's
    /// lifetime, since every new in-memory connection is a fresh database.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails or a
    /// migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");

        if !in_memory {
            ensure_parent_dir(database_url).await?;
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid DATABASE_URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(FILE_POOL_SIZE)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(in_memory, "Database ready");
        Ok(db)
    }

    /// Underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Liveness check used by the health endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not answer
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// Create all tables and indexes; safe to run repeatedly
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        }
        debug!(statements = SCHEMA.len(), "Schema migrated");
        Ok(())
    }

    /// Accounts
    #[must_use]
    pub fn users(&self) -> UsersManager {
        UsersManager::new(self.pool.clone())
    }

    /// Dish catalogue
    #[must_use]
    pub fn dishes(&self) -> DishesManager {
        DishesManager::new(self.pool.clone())
    }

    /// Meal logs
    #[must_use]
    pub fn meals(&self) -> MealLogManager {
        MealLogManager::new(self.pool.clone())
    }

    /// Fridge inventory
    #[must_use]
    pub fn fridge(&self) -> FridgeManager {
        FridgeManager::new(self.pool.clone())
    }

    /// Promotions
    #[must_use]
    pub fn promotions(&self) -> PromotionsManager {
        PromotionsManager::new(self.pool.clone())
    }

    /// Notifications
    #[must_use]
    pub fn notifications(&self) -> NotificationsManager {
        NotificationsManager::new(self.pool.clone())
    }

    /// Virtual taste profiles
    #[must_use]
    pub fn profiles(&self) -> ProfilesManager {
        ProfilesManager::new(self.pool.clone())
    }
}

async fn ensure_parent_dir(database_url: &str) -> AppResult<()> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split_once('?').map_or(path, |(p, _)| p);

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::database(format!(
                "Failed to create database directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        display_name TEXT,
        role TEXT NOT NULL DEFAULT 'user',
        nutrition TEXT,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS dishes (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        name_key TEXT NOT NULL UNIQUE,
        category TEXT NOT NULL,
        origin TEXT NOT NULL,
        calories INTEGER NOT NULL CHECK (calories > 0),
        description TEXT,
        image_url TEXT,
        ingredients TEXT NOT NULL DEFAULT '[]',
        tags TEXT NOT NULL DEFAULT '[]',
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_dishes_category ON dishes(category)",
    "CREATE INDEX IF NOT EXISTS idx_dishes_active ON dishes(is_active)",
    r"
    CREATE TABLE IF NOT EXISTS meal_logs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        dish_id TEXT,
        dish_name TEXT NOT NULL,
        meal_type TEXT NOT NULL,
        calories INTEGER NOT NULL,
        eaten_at TEXT NOT NULL,
        notes TEXT
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_meal_logs_user_time ON meal_logs(user_id, eaten_at)",
    r"
    CREATE TABLE IF NOT EXISTS fridge_items (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        quantity REAL NOT NULL,
        unit TEXT NOT NULL,
        expires_on TEXT,
        added_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_fridge_items_user ON fridge_items(user_id, expires_on)",
    r"
    CREATE TABLE IF NOT EXISTS promotions (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        dish_id TEXT REFERENCES dishes(id) ON DELETE SET NULL,
        discount_percent INTEGER,
        starts_at TEXT NOT NULL,
        ends_at TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_promotions_window ON promotions(is_active, starts_at, ends_at)",
    r"
    CREATE TABLE IF NOT EXISTS notifications (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        user_id TEXT REFERENCES users(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_notifications_audience ON notifications(user_id, created_at)",
    r"
    CREATE TABLE IF NOT EXISTS notification_reads (
        notification_id TEXT NOT NULL REFERENCES notifications(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        read_at TEXT NOT NULL,
        PRIMARY KEY (notification_id, user_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS virtual_profiles (
        user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        origin_scores TEXT NOT NULL DEFAULT '{}',
        category_scores TEXT NOT NULL DEFAULT '{}',
        interactions INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL
    )
    ",
];
