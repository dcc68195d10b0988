// ABOUTME: Shared test helpers and utilities for integration tests
// ABOUTME: Exports the axum request harness and the scripted language model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
pub mod mock_llm;
