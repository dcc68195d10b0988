// ABOUTME: Shared server state handed to every route as axum State
// ABOUTME: Database, auth manager, configuration and the flow runner behind one Arc
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::flows::FlowRunner;
use crate::llm::LlmProvider;

/// Everything a request handler needs
pub struct ServerResources {
    /// SQLite store
    pub database: Database,
    /// Token issue and validation
    pub auth: AuthManager,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Suggestion flows
    pub flows: FlowRunner,
}

impl ServerResources {
    /// Wire resources from configuration and an optional model
    #[must_use]
    pub fn new(
        database: Database,
        config: Arc<ServerConfig>,
        provider: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        let auth = AuthManager::new(&config.auth.jwt_secret, config.auth.jwt_expiry_hours);
        let flows = FlowRunner::new(provider, config.flow);
        Self {
            database,
            auth,
            config,
            flows,
        }
    }
}
