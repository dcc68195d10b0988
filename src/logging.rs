// ABOUTME: Structured logging setup on tracing-subscriber with env-driven format and filters
// ABOUTME: Noise reduction for HTTP/database crates, startup record and audit helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! Structured logging
//!
//! | variable | effect |
//! |---|---|
//! | `RUST_LOG` | base filter (default `info`) |
//! | `LOG_FORMAT` | `json`, `pretty` (default) or `compact` |
//! | `LOG_INCLUDE_LOCATION` | file and line numbers |
//! | `LOG_INCLUDE_THREAD` | thread ids and names |
//! | `LOG_INCLUDE_SPANS` | span open/close events |

use anyhow::{anyhow, Result};
use mealmate_core::constants::service_names;
use serde_json::json;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Base filter directive
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include file and line
    pub include_location: bool,
    /// Include thread ids and names
    pub include_thread: bool,
    /// Emit span open/close events
    pub include_spans: bool,
    /// Service name in the startup record
    pub service_name: String,
    /// Service version in the startup record
    pub service_version: String,
    /// Deployment environment name
    pub environment: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Multi-field human format
    Pretty,
    /// Single-line human format
    Compact,
}

impl LogFormat {
    /// Parse `LOG_FORMAT`, defaulting to pretty
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            include_spans: false,
            service_name: service_names::MEALMATE_SERVER.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Read logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment.eq_ignore_ascii_case("production");

        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format: env::var("LOG_FORMAT").map_or(
                if is_production { LogFormat::Json } else { LogFormat::Pretty },
                |f| LogFormat::from_str_or_default(&f),
            ),
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: env::var("LOG_INCLUDE_THREAD").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| service_names::MEALMATE_SERVER.into()),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment,
        }
    }

    /// Filter with noise reduction for dependency crates
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let quiet = |directive: &str, fallback: tracing::Level| {
            directive.parse().unwrap_or_else(|_| fallback.into())
        };

        EnvFilter::new(&self.level)
            .add_directive(quiet("hyper=warn", tracing::Level::WARN))
            .add_directive(quiet("h2=warn", tracing::Level::WARN))
            .add_directive(quiet("reqwest=warn", tracing::Level::WARN))
            .add_directive(quiet("sqlx=warn", tracing::Level::WARN))
            .add_directive(quiet("tower_http=info", tracing::Level::INFO))
    }

    /// Install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let installed = match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_thread_ids(self.include_thread)
                        .with_thread_names(self.include_thread)
                        .with_span_events(span_events)
                        .with_writer(io::stdout),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_thread_ids(self.include_thread)
                        .with_thread_names(self.include_thread)
                        .with_span_events(span_events)
                        .with_writer(io::stdout),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(io::stdout),
                )
                .try_init(),
        };
        installed.map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Mealmate server starting up"
        );

        let summary = json!({
            "service": {
                "name": self.service_name,
                "version": self.service_version,
                "environment": self.environment,
            },
            "logging": {
                "level": self.level,
                "format": format!("{:?}", self.format),
                "location": self.include_location,
                "thread": self.include_thread,
                "spans": self.include_spans,
            }
        });
        info!("Logging configured: {summary}");
    }
}

/// Initialize logging from environment variables
///
/// # Errors
///
/// Returns an error if logging is already initialized
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Audit-style log records
pub struct AppLogger;

impl AppLogger {
    /// Registration and login outcomes
    pub fn log_auth_event(email: &str, event: &str, success: bool, details: Option<&str>) {
        info!(
            user.email = %email,
            auth.event = %event,
            auth.success = %success,
            auth.details = details.unwrap_or(""),
            "Authentication event"
        );
    }

    /// Content changes made through the admin API
    pub fn log_admin_action(admin_email: &str, action: &str, resource: &str, resource_id: &str) {
        info!(
            admin.email = %admin_email,
            admin.action = %action,
            resource.kind = %resource,
            resource.id = %resource_id,
            "Admin action"
        );
    }
}
