// ABOUTME: Route module organization for the Mealmate HTTP surface
// ABOUTME: Merges every domain router and wraps it in request-id, tracing, CORS and timeout layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! Route module for the Mealmate server
//!
//! Each domain module contains route definitions and thin handlers that
//! delegate to the database managers and the suggestion flows.

/// Admin content management routes
pub mod admin;
/// Registration and login routes
pub mod auth;
/// Catalogue browsing routes
pub mod dishes;
/// Fridge inventory routes
pub mod fridge;
/// Health check route
pub mod health;
/// Meal log and daily summary routes
pub mod meals;
/// Notification inbox routes
pub mod notifications;
/// Taste and nutrition profile routes
pub mod profile;
/// Live promotion routes
pub mod promotions;
/// AI suggestion routes
pub mod recommendations;

pub use admin::AdminRoutes;
pub use auth::{AuthResponse, AuthRoutes, LoginRequest, RegisterRequest};
pub use dishes::DishesRoutes;
pub use fridge::FridgeRoutes;
pub use health::HealthRoutes;
pub use meals::MealsRoutes;
pub use notifications::NotificationsRoutes;
pub use profile::ProfileRoutes;
pub use promotions::PromotionsRoutes;
pub use recommendations::RecommendationsRoutes;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use http::{header, HeaderName, Method, Request};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::errors::ErrorResponse;
use crate::resources::ServerResources;

/// Request id header set on every request and echoed on every response
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upper bound for one request, generous enough for a multi-day plan with retries
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the complete application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(DishesRoutes::routes(Arc::clone(&resources)))
        .merge(MealsRoutes::routes(Arc::clone(&resources)))
        .merge(FridgeRoutes::routes(Arc::clone(&resources)))
        .merge(ProfileRoutes::routes(Arc::clone(&resources)))
        .merge(RecommendationsRoutes::routes(Arc::clone(&resources)))
        .merge(PromotionsRoutes::routes(Arc::clone(&resources)))
        .merge(NotificationsRoutes::routes(Arc::clone(&resources)))
        .merge(AdminRoutes::routes(resources))
        .layer(middleware::from_fn(stamp_request_id))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(setup_cors())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id,
            )
        }))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

/// Copy the request id into error envelopes produced by `AppError`
async fn stamp_request_id(request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    let mut response = next.run(request).await;
    let Some(request_id) = request_id else {
        return response;
    };
    let Some(mut envelope) = response.extensions_mut().remove::<ErrorResponse>() else {
        return response;
    };

    envelope.error.request_id = Some(request_id);
    let (parts, _) = response.into_parts();
    let mut stamped = (parts.status, Json(envelope)).into_response();
    for (name, value) in &parts.headers {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            stamped.headers_mut().append(name.clone(), value.clone());
        }
    }
    stamped
}

fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}
