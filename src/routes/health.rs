// ABOUTME: Health check route handlers for service monitoring
// ABOUTME: Reports database reachability and which language model backs the flows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! Health check routes for service monitoring
//!
//! `/health` needs no authentication. It answers 503 when the database does
//! not respond; a missing language model is reported but still healthy since
//! every flow has a fallback.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::service_names::MEALMATE_SERVER;
use crate::resources::ServerResources;

/// Health report
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
    /// Provider name, `None` when suggestions always use fallbacks
    pub llm_provider: Option<String>,
    pub timestamp: String,
}

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .with_state(resources)
    }

    /// Handle GET /health
    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Response {
        let database_ok = match resources.database.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Health check database ping failed");
                false
            }
        };

        let response = HealthResponse {
            status: if database_ok { "healthy" } else { "degraded" }.to_owned(),
            service: MEALMATE_SERVER.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            database: if database_ok { "ok" } else { "unavailable" }.to_owned(),
            llm_provider: resources.flows.provider_name().map(str::to_owned),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let status = if database_ok {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        (status, Json(response)).into_response()
    }
}
