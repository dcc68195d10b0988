// ABOUTME: Domain models shared by the intelligence engine and the HTTP server
// ABOUTME: Dishes, meal logs, fridge items, promotions, notifications, users and taste profiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

mod content;
mod dish;
mod fridge;
mod meal;
mod profile;
mod user;

pub use content::{
    Notification, NotificationDraft, Promotion, PromotionDraft, UserNotification,
};
pub use dish::{Dish, DishCategory, DishDraft, DishUpdate, MealType};
pub use fridge::{FridgeItem, FridgeItemDraft, FridgeItemUpdate};
pub use meal::{validate_logged_calories, LogMealRequest, MealLog};
pub use profile::{InteractionKind, VirtualProfile};
pub use user::{ActivityLevel, NutritionGoal, NutritionProfile, Sex, User, UserRole};
