// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for the OAuth flow, the Strava client, and API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failures of the OAuth authorization-code flow.
///
/// Messages never include token values or the authorization code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The user declined, or Strava reported an error on the callback.
    #[error("{0}")]
    ProviderDenied(String),

    #[error("Invalid state parameter")]
    CsrfMismatch,

    #[error("No authorization code received")]
    MissingCode,

    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Failed to generate random token")]
    StateGeneration,
}

impl AuthError {
    /// Short machine-readable code used in redirects and JSON bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::ProviderDenied(_) => "login_error",
            AuthError::CsrfMismatch => "security_error",
            AuthError::MissingCode => "authentication_error",
            AuthError::TokenExchangeFailed(_) | AuthError::RefreshFailed(_) => "login_required",
            AuthError::StateGeneration => "internal_error",
        }
    }

    /// Message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::ProviderDenied(msg) => format!("Error: {}", msg),
            AuthError::CsrfMismatch | AuthError::MissingCode => self.to_string(),
            AuthError::TokenExchangeFailed(_) | AuthError::RefreshFailed(_) => {
                "Failed to authenticate with Strava. Please log in again.".to_string()
            }
            AuthError::StateGeneration => "Internal error, please try again.".to_string(),
        }
    }
}

/// Failures talking to the Strava HTTP API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StravaError {
    #[error("Strava rate limit exceeded")]
    RateLimited,

    #[error("Strava rejected the access token")]
    Unauthorized,

    #[error("Resource not found on Strava")]
    NotFound,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("JSON parse error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StravaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StravaError::Decode(err.to_string())
        } else {
            // Strip the URL so query strings never end up in logs.
            StravaError::Transport(err.without_url().to_string())
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "login_required",
                Some("Please log in again".to_string()),
            ),
            AppError::Auth(err) => {
                let status = match err {
                    AuthError::CsrfMismatch => StatusCode::FORBIDDEN,
                    AuthError::ProviderDenied(_) | AuthError::MissingCode => {
                        StatusCode::BAD_REQUEST
                    }
                    AuthError::TokenExchangeFailed(_) | AuthError::RefreshFailed(_) => {
                        StatusCode::UNAUTHORIZED
                    }
                    AuthError::StateGeneration => StatusCode::INTERNAL_SERVER_ERROR,
                };
                tracing::warn!(error = %err, code = err.code(), "Authentication error");
                (status, err.code(), Some(err.user_message()))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
