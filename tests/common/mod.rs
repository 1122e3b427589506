// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use strava_dashboard::config::Config;
use strava_dashboard::models::{AuthSession, TokenSet};
use strava_dashboard::routes::create_router;
use strava_dashboard::services::{AuthFlow, AuthenticatedClient, StravaClient};
use strava_dashboard::AppState;
use wiremock::MockServer;

/// Config pointing every Strava endpoint at the mock server.
#[allow(dead_code)]
pub fn test_config(server: &MockServer) -> Config {
    Config {
        strava_oauth_url: server.uri(),
        strava_api_url: server.uri(),
        http_timeout: Duration::from_secs(2),
        ..Config::default()
    }
}

/// Create a test app backed by the mock server.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(server: &MockServer) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(test_config(server))
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config).expect("Failed to build state"));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn test_client(server: &MockServer) -> StravaClient {
    StravaClient::from_config(&test_config(server)).expect("Failed to build client")
}

#[allow(dead_code)]
pub fn test_flow(server: &MockServer) -> AuthFlow {
    AuthFlow::new(test_client(server))
}

#[allow(dead_code)]
pub fn authenticated_client(server: &MockServer) -> AuthenticatedClient {
    AuthenticatedClient::new(test_client(server), "test_access".to_string())
}

#[allow(dead_code)]
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Token endpoint response body.
#[allow(dead_code)]
pub fn token_response(access: &str, refresh: &str, expires_at: i64) -> Value {
    json!({
        "token_type": "Bearer",
        "access_token": access,
        "refresh_token": refresh,
        "expires_at": expires_at,
        "expires_in": 21600,
        "athlete": {"id": 4242, "firstname": "Test", "lastname": "Athlete"}
    })
}

/// Session that completed login and holds tokens expiring at `expires_at`.
#[allow(dead_code)]
pub fn authenticated_session(expires_at: i64) -> AuthSession {
    let mut session = AuthSession::default();
    session.store_tokens(TokenSet {
        access_token: "old_access".to_string(),
        refresh_token: "old_refresh".to_string(),
        expires_at,
    });
    session
}

/// One element of the athlete activity list.
#[allow(dead_code)]
pub fn activity_json(id: u64, activity_type: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Activity {}", id),
        "type": activity_type,
        "sport_type": activity_type,
        "start_date": "2024-03-01T15:00:00Z",
        "start_date_local": "2024-03-01T07:00:00Z",
        "kudos_count": 2,
        "distance": 10000.0,
        "moving_time": 3000,
        "elapsed_time": 3200,
        "total_elevation_gain": 150.0,
        "average_speed": 3.3,
        "max_speed": 5.1,
        "average_heartrate": 140.0,
        "max_heartrate": 172.0
    })
}
