// ABOUTME: Core types and constants for the Mealmate meal-planning platform
// ABOUTME: Foundation crate with error handling, domain models and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

#![deny(unsafe_code)]

//! # Mealmate Core
//!
//! Foundation crate providing shared types for the Mealmate platform. It has
//! no IO of its own so the intelligence crate and the server can both depend
//! on it.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **models**: Dishes, meal logs, fridge items, content and taste profiles
//! - **constants**: Limits and heuristic weights

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models
pub mod models;
