// ABOUTME: Server binary for the Mealmate HTTP API
// ABOUTME: Loads configuration, opens the database, picks the language model and serves axum routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! # Mealmate Server Binary
//!
//! Starts the HTTP API. When no language model can be configured the server
//! still runs and every suggestion uses its heuristic fallback.

use anyhow::{Context, Result};
use clap::Parser;
use mealmate::{
    config::ServerConfig,
    database::Database,
    llm::{ChatProvider, LlmProvider},
    logging,
    resources::ServerResources,
    routes::build_router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "mealmate-server")]
#[command(about = "Mealmate - meal logging, virtual fridge and AI-assisted meal planning API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    logging::init_from_env()?;

    info!("Starting Mealmate server");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url)
        .await
        .context("Failed to open database")?;
    info!("Database ready at {}", config.database_url);

    let provider: Option<Arc<dyn LlmProvider>> = match ChatProvider::from_env() {
        Ok(Some(provider)) => {
            info!("Suggestions backed by {}", provider.name());
            if !provider
                .available_models()
                .iter()
                .any(|m| *m == provider.default_model())
            {
                info!(
                    model = provider.default_model(),
                    "Model is not in the known list for {}, passing it through",
                    provider.display_name()
                );
            }
            let provider: Arc<dyn LlmProvider> = Arc::new(provider);
            tokio::spawn(check_provider(Arc::clone(&provider)));
            Some(provider)
        }
        Ok(None) => {
            info!("No language model configured, suggestions use heuristic fallbacks");
            None
        }
        Err(e) => {
            warn!("Language model unavailable ({e}), suggestions use heuristic fallbacks");
            None
        }
    };

    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(database, Arc::new(config), provider));
    let app = build_router(resources);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    display_endpoints(port);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}

async fn check_provider(provider: Arc<dyn LlmProvider>) {
    match provider.health_check().await {
        Ok(true) => info!("{} is reachable", provider.display_name()),
        Ok(false) => warn!(
            "{} health check failed, suggestions may use fallbacks",
            provider.display_name()
        ),
        Err(e) => warn!(
            "{} is unreachable ({e}), suggestions may use fallbacks",
            provider.display_name()
        ),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[allow(clippy::cognitive_complexity)]
fn display_endpoints(port: u16) {
    let host = "localhost";
    info!("Mealmate listening on http://{host}:{port}");
    info!("   Health Check:      GET  http://{host}:{port}/health");
    info!("   Register / Login:  POST http://{host}:{port}/auth/register | /auth/login");
    info!("   Catalogue:         GET  http://{host}:{port}/api/dishes");
    info!("   Meal Log:          GET  http://{host}:{port}/api/meals?date=YYYY-MM-DD");
    info!("   Fridge:            GET  http://{host}:{port}/api/fridge");
    info!("   Suggestions:       POST http://{host}:{port}/api/recommendations/{{meal,day,plan,recipe}}");
    info!("   Admin:             http://{host}:{port}/admin/{{dishes,promotions,notifications}}");
}
