// ABOUTME: Admin-managed content models: promotions and notifications
// ABOUTME: Includes live-window checks for promotions and broadcast/targeted notification audiences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// A time-boxed promotion, optionally tied to a dish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    /// Unique identifier
    pub id: Uuid,
    /// Headline
    pub title: String,
    /// Body text
    pub description: String,
    /// Promoted dish, if any
    pub dish_id: Option<Uuid>,
    /// Discount in percent (1-100)
    pub discount_percent: Option<u8>,
    /// Start of the live window (inclusive)
    pub starts_at: DateTime<Utc>,
    /// End of the live window (exclusive)
    pub ends_at: DateTime<Utc>,
    /// Manual kill switch
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Whether the promotion is live at `now`
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.starts_at <= now && now < self.ends_at
    }
}

/// Fields required to create or replace a promotion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionDraft {
    /// Headline
    pub title: String,
    /// Body text
    #[serde(default)]
    pub description: String,
    /// Promoted dish
    #[serde(default)]
    pub dish_id: Option<Uuid>,
    /// Discount in percent
    #[serde(default)]
    pub discount_percent: Option<u8>,
    /// Start of the live window
    pub starts_at: DateTime<Utc>,
    /// End of the live window
    pub ends_at: DateTime<Utc>,
    /// Active flag
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl PromotionDraft {
    /// Validate draft fields
    ///
    /// # Errors
    ///
    /// Returns an error if the title is empty, the window is empty or the
    /// discount is outside 1-100
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::invalid_input("Promotion title must not be empty"));
        }
        if self.starts_at >= self.ends_at {
            return Err(AppError::invalid_input(
                "Promotion starts_at must be before ends_at",
            ));
        }
        if let Some(discount) = self.discount_percent {
            if !(1..=100).contains(&discount) {
                return Err(AppError::out_of_range(
                    "discount_percent must be between 1 and 100",
                ));
            }
        }
        Ok(())
    }
}

/// A notification shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier
    pub id: Uuid,
    /// Title
    pub title: String,
    /// Body
    pub body: String,
    /// Target user; `None` broadcasts to everyone
    pub user_id: Option<Uuid>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A notification together with the caller's read state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNotification {
    /// The notification
    #[serde(flatten)]
    pub notification: Notification,
    /// Whether the user has read it
    pub read: bool,
}

/// Request body to create a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDraft {
    /// Title
    pub title: String,
    /// Body
    pub body: String,
    /// Target user (omit to broadcast)
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl NotificationDraft {
    /// Validate draft fields
    ///
    /// # Errors
    ///
    /// Returns an error if title or body is empty
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() || self.body.trim().is_empty() {
            return Err(AppError::invalid_input(
                "Notification title and body must not be empty",
            ));
        }
        Ok(())
    }
}
