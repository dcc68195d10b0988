// ABOUTME: Configuration module for the Mealmate server
// ABOUTME: Environment-driven server settings and the shared config enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! Configuration for the Mealmate server
//!
//! - **environment**: [`ServerConfig`] and [`FlowConfig`] read from environment variables
//! - **types**: [`Environment`] and [`LlmProviderType`]

/// Server configuration from environment variables
pub mod environment;

/// Shared configuration enums
pub mod types;

pub use environment::{env_keys, AuthConfig, FlowConfig, ServerConfig};
pub use types::{Environment, LlmProviderType};
