// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

/// Path the provider redirects back to after authorization.
pub const CALLBACK_PATH: &str = "/strava-oauth";

/// Upper bound for the stream cache, regardless of configuration.
pub const MAX_STREAM_CACHE_CAPACITY: usize = 100;

/// Default upper bound on stored sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Longest accepted activity look-back window (ten years).
pub const MAX_ACTIVITY_WINDOW_DAYS: i64 = 3650;

/// Application configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Where the browser lands after login or a login error
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Base URL for `/oauth/authorize` and `/oauth/token`
    pub strava_oauth_url: String,
    /// Base URL for the Strava data API
    pub strava_api_url: String,
    /// Timeout applied to every outbound Strava request
    pub http_timeout: Duration,
    /// Default activity look-back window in days
    pub activity_window_days: i64,
    /// Default maximum number of activities per fetch
    pub activity_limit: usize,
    /// Capacity of the process-wide stream cache
    pub stream_cache_capacity: usize,
    /// Maximum number of stored sessions
    pub max_sessions: usize,

    // --- Secrets ---
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Signing key for session cookies (raw bytes)
    pub session_signing_key: Vec<u8>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("strava_client_id", &self.strava_client_id)
            .field("frontend_url", &self.frontend_url)
            .field("port", &self.port)
            .field("strava_oauth_url", &self.strava_oauth_url)
            .field("strava_api_url", &self.strava_api_url)
            .field("http_timeout", &self.http_timeout)
            .field("activity_window_days", &self.activity_window_days)
            .field("activity_limit", &self.activity_limit)
            .field("stream_cache_capacity", &self.stream_cache_capacity)
            .field("max_sessions", &self.max_sessions)
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            frontend_url: "http://localhost:8050".to_string(),
            port: 8050,
            strava_oauth_url: "https://www.strava.com".to_string(),
            strava_api_url: "https://www.strava.com/api/v3".to_string(),
            http_timeout: Duration::from_secs(10),
            activity_window_days: 90,
            activity_limit: 100,
            stream_cache_capacity: MAX_STREAM_CACHE_CAPACITY,
            max_sessions: DEFAULT_MAX_SESSIONS,
            strava_client_secret: "test_secret".to_string(),
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            frontend_url: env::var("FRONTEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8050".to_string()),
            port: parse_or("PORT", 8050),
            strava_oauth_url: env::var("STRAVA_OAUTH_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://www.strava.com".to_string()),
            strava_api_url: env::var("STRAVA_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://www.strava.com/api/v3".to_string()),
            http_timeout: Duration::from_secs(parse_or("STRAVA_HTTP_TIMEOUT_SECS", 10)),
            activity_window_days: parse_or("ACTIVITY_WINDOW_DAYS", 90)
                .clamp(1, MAX_ACTIVITY_WINDOW_DAYS),
            activity_limit: parse_or("ACTIVITY_LIMIT", 100),
            stream_cache_capacity: parse_or("STREAM_CACHE_CAPACITY", MAX_STREAM_CACHE_CAPACITY)
                .clamp(1, MAX_STREAM_CACHE_CAPACITY),
            max_sessions: parse_or("MAX_SESSIONS", DEFAULT_MAX_SESSIONS).max(1),

            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            session_signing_key: env::var("SESSION_SECRET")
                .map_err(|_| ConfigError::Missing("SESSION_SECRET"))?
                .into_bytes(),
        })
    }
}

/// Read and parse an optional variable, falling back when unset or malformed.
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
