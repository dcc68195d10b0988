// ABOUTME: Server configuration loaded from environment variables
// ABOUTME: HTTP, database, JWT, nutrition defaults and suggestion-flow tuning with a redacted summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use anyhow::{bail, Context, Result};
use mealmate_core::constants::nutrition::DEFAULT_DAILY_CALORIES;
use std::env;
use std::fmt;
use tracing::{info, warn};

use super::types::{Environment, LlmProviderType};
use crate::auth::generate_jwt_secret;

/// Environment variable names
pub mod env_keys {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "MEALMATE_HTTP_PORT";
    /// sqlx connection URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// HS256 signing secret
    pub const JWT_SECRET: &str = "JWT_SECRET";
    /// Token lifetime in hours
    pub const JWT_EXPIRY_HOURS: &str = "JWT_EXPIRY_HOURS";
    /// Email that receives the admin role on registration
    pub const ADMIN_EMAIL: &str = "MEALMATE_ADMIN_EMAIL";
    /// Daily kcal target used without a nutrition profile
    pub const DEFAULT_CALORIE_TARGET: &str = "MEALMATE_DEFAULT_CALORIE_TARGET";
    /// Model attempts per flow
    pub const FLOW_MAX_ATTEMPTS: &str = "MEALMATE_FLOW_MAX_ATTEMPTS";
    /// Sampling temperature for flows
    pub const FLOW_TEMPERATURE: &str = "MEALMATE_FLOW_TEMPERATURE";
    /// Candidate dishes listed in prompts
    pub const FLOW_MAX_CANDIDATES: &str = "MEALMATE_FLOW_MAX_CANDIDATES";
}

const DEFAULT_HTTP_PORT: u16 = 8081;
const DEFAULT_DATABASE_URL: &str = "sqlite:./data/mealmate.db";
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
const MAX_FLOW_ATTEMPTS: u32 = 5;

/// Tuning shared by every suggestion flow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowConfig {
    /// Model calls before falling back, `1..=5`
    pub max_attempts: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Candidate dishes listed in a prompt
    pub max_candidates: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            temperature: 0.7,
            max_candidates: 20,
        }
    }
}

impl FlowConfig {
    /// Read flow tuning from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a set value does not parse
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let max_attempts: u32 = env_var_or(
            env_keys::FLOW_MAX_ATTEMPTS,
            &defaults.max_attempts.to_string(),
        )
        .parse()
        .context("Invalid MEALMATE_FLOW_MAX_ATTEMPTS value")?;
        let temperature: f32 = env_var_or(
            env_keys::FLOW_TEMPERATURE,
            &defaults.temperature.to_string(),
        )
        .parse()
        .context("Invalid MEALMATE_FLOW_TEMPERATURE value")?;
        let max_candidates: usize = env_var_or(
            env_keys::FLOW_MAX_CANDIDATES,
            &defaults.max_candidates.to_string(),
        )
        .parse()
        .context("Invalid MEALMATE_FLOW_MAX_CANDIDATES value")?;

        if !(0.0..=2.0).contains(&temperature) {
            bail!("MEALMATE_FLOW_TEMPERATURE must be between 0.0 and 2.0");
        }

        Ok(Self {
            max_attempts: max_attempts.clamp(1, MAX_FLOW_ATTEMPTS),
            temperature,
            max_candidates: max_candidates.max(1),
        })
    }
}

/// JWT settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 secret bytes
    pub jwt_secret: Vec<u8>,
    /// Whether the secret was generated at startup
    pub jwt_secret_generated: bool,
    /// Token lifetime
    pub jwt_expiry_hours: i64,
    /// Registration with this email grants the admin role
    pub admin_email: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_secret_generated", &self.jwt_secret_generated)
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("admin_email", &self.admin_email)
            .finish()
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// HTTP listen port
    pub http_port: u16,
    /// sqlx SQLite URL
    pub database_url: String,
    /// JWT settings
    pub auth: AuthConfig,
    /// Daily kcal target when neither request nor profile gives one
    pub default_calorie_target: u32,
    /// Flow tuning
    pub flow: FlowConfig,
    /// Selected LLM backend, `None` when disabled
    pub llm_provider: Option<LlmProviderType>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a value does not parse or `JWT_SECRET` is missing
    /// in production
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let environment = Environment::from_env();

        let http_port: u16 = env_var_or(env_keys::HTTP_PORT, &DEFAULT_HTTP_PORT.to_string())
            .parse()
            .context("Invalid MEALMATE_HTTP_PORT value")?;
        let database_url = env_var_or(env_keys::DATABASE_URL, DEFAULT_DATABASE_URL);

        let jwt_expiry_hours: i64 = env_var_or(
            env_keys::JWT_EXPIRY_HOURS,
            &DEFAULT_JWT_EXPIRY_HOURS.to_string(),
        )
        .parse()
        .context("Invalid JWT_EXPIRY_HOURS value")?;
        if jwt_expiry_hours <= 0 {
            bail!("JWT_EXPIRY_HOURS must be positive");
        }

        let (jwt_secret, jwt_secret_generated) = match env::var(env_keys::JWT_SECRET) {
            Ok(secret) if !secret.is_empty() => (secret.into_bytes(), false),
            _ if environment.is_production() => {
                bail!("JWT_SECRET must be set when ENVIRONMENT=production")
            }
            _ => {
                warn!("JWT_SECRET not set; generated a random secret, tokens will not survive a restart");
                (generate_jwt_secret().to_vec(), true)
            }
        };

        let admin_email = env::var(env_keys::ADMIN_EMAIL)
            .ok()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());

        let default_calorie_target: u32 = env_var_or(
            env_keys::DEFAULT_CALORIE_TARGET,
            &DEFAULT_DAILY_CALORIES.to_string(),
        )
        .parse()
        .context("Invalid MEALMATE_DEFAULT_CALORIE_TARGET value")?;
        if default_calorie_target == 0 {
            bail!("MEALMATE_DEFAULT_CALORIE_TARGET must be positive");
        }

        Ok(Self {
            environment,
            http_port,
            database_url,
            auth: AuthConfig {
                jwt_secret,
                jwt_secret_generated,
                jwt_expiry_hours,
                admin_email,
            },
            default_calorie_target,
            flow: FlowConfig::from_env()?,
            llm_provider: LlmProviderType::from_env(),
        })
    }

    /// Human-readable summary with secrets redacted
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Mealmate Server Configuration:\n\
             - Environment: {}\n\
             - HTTP Port: {}\n\
             - Database: {}\n\
             - JWT Secret: {}\n\
             - JWT Expiry: {}h\n\
             - Admin Email: {}\n\
             - Default Calorie Target: {} kcal\n\
             - LLM Provider: {}\n\
             - Flow Attempts: {}\n\
             - Flow Temperature: {}\n\
             - Flow Candidates: {}",
            self.environment,
            self.http_port,
            redact_database_url(&self.database_url),
            if self.auth.jwt_secret_generated {
                "Generated"
            } else {
                "Configured"
            },
            self.auth.jwt_expiry_hours,
            if self.auth.admin_email.is_some() {
                "Configured"
            } else {
                "Not set"
            },
            self.default_calorie_target,
            self.llm_provider
                .map_or_else(|| "Disabled".to_owned(), |p| p.to_string()),
            self.flow.max_attempts,
            self.flow.temperature,
            self.flow.max_candidates,
        )
    }
}

/// Strip query parameters, which may carry credentials
fn redact_database_url(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
