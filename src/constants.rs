// ABOUTME: Re-exports domain constants from mealmate-core
// ABOUTME: Limits, scoring weights, nutrition defaults and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! Application constants, see [`mealmate_core::constants`]

pub use mealmate_core::constants::{limits, nutrition, profile, scoring, service_names};
