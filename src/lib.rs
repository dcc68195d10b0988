// ABOUTME: Main library entry point for the Mealmate meal-planning backend
// ABOUTME: Wires persistence, auth, AI suggestion flows and the axum HTTP surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

#![deny(unsafe_code)]

//! # Mealmate
//!
//! A meal-planning and nutrition-coaching backend. Users browse a curated
//! dish catalogue, log what they eat, keep a virtual fridge and ask for
//! suggestions. Suggestions come from a language model when one is
//! configured; every answer is validated against the catalogue and replaced
//! by a deterministic heuristic fallback when the model fails.
//!
//! ## Architecture
//!
//! - **`mealmate-core`**: domain models, error types and constants
//! - **`mealmate-intelligence`**: scoring, nutrition math, plan validation and fallbacks
//! - **database**: SQLite managers, one per aggregate
//! - **llm**: pluggable text-completion providers
//! - **flows**: AI-with-fallback orchestration
//! - **routes**: user and admin HTTP endpoints
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mealmate::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Mealmate configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// JWT authentication and password hashing
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Domain constants
pub mod constants;

/// SQLite persistence
pub mod database;

/// Unified error handling
pub mod errors;

/// AI suggestion flows with heuristic fallbacks
pub mod flows;

/// Language model providers
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Shared server state
pub mod resources;

/// HTTP routes
pub mod routes;

pub use mealmate_core::models;
