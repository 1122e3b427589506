// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava Dashboard: view recent Strava activity history
//!
//! This crate provides the backend for logging in with Strava via OAuth,
//! fetching the athlete's recent activities, and serving summary
//! statistics and per-activity profiles to the dashboard frontend.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use error::StravaError;
use services::{ActivityFetcher, AuthFlow, SessionStore, StravaClient, StreamCache};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub auth_flow: AuthFlow,
    pub activities: ActivityFetcher,
}

impl AppState {
    /// Wire up the services described by `config`.
    pub fn new(config: Config) -> Result<Self, StravaError> {
        let client = StravaClient::from_config(&config)?;
        let cache = StreamCache::new(config.stream_cache_capacity);

        Ok(Self {
            sessions: SessionStore::new(config.max_sessions),
            auth_flow: AuthFlow::new(client),
            activities: ActivityFetcher::new(cache, config.activity_window_days),
            config,
        })
    }
}
