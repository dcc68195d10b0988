// ABOUTME: Re-exports the unified error types from mealmate-core
// ABOUTME: AppError, ErrorCode and AppResult used across the server crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! Unified error handling, see [`mealmate_core::errors`]

pub use mealmate_core::errors::{AppError, AppResult, ErrorCode, ErrorContext, ErrorResponse};
