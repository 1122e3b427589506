// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava Dashboard API Server
//!
//! Lets a user log in with Strava and serves their recent activity
//! history, summary statistics and per-activity profiles.

use std::sync::Arc;
use strava_dashboard::{config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        timeout_secs = config.http_timeout.as_secs(),
        "Starting Strava Dashboard API"
    );

    let state = AppState::new(config.clone())?;
    tracing::info!(
        cache_capacity = state.activities.cache().capacity(),
        max_sessions = state.sessions.max_sessions(),
        "Stream cache and session store initialized"
    );

    let app = strava_dashboard::routes::create_router(Arc::new(state));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let mut filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    if let Ok(directive) = "strava_dashboard=debug".parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
