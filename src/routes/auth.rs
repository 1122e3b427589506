// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth authentication routes.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::config::CALLBACK_PATH;
use crate::error::{AppError, AuthError, Result};
use crate::middleware::auth::{
    create_session_token, session_cookie, session_id_from_jar, session_removal_cookie,
};
use crate::models::AuthSession;
use crate::services::CallbackParams;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", get(login_url))
        .route("/auth/strava", get(auth_start))
        .route(CALLBACK_PATH, get(auth_callback))
        .route("/auth/logout", get(logout).post(logout))
}

/// Login link for the frontend's login page.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub auth_url: String,
}

/// Return the Strava authorization URL as JSON.
async fn login_url(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let (jar, auth_url) = begin_login(&state, jar, &headers)?;
    Ok((jar, Json(LoginResponse { auth_url })))
}

/// Start OAuth flow - redirect to Strava authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Redirect)> {
    let (jar, auth_url) = begin_login(&state, jar, &headers)?;
    Ok((jar, Redirect::temporary(&auth_url)))
}

/// Store a fresh OAuth state on the caller's session and build the auth URL.
fn begin_login(state: &AppState, jar: CookieJar, headers: &HeaderMap) -> Result<(CookieJar, String)> {
    let origin = request_origin(headers, &state.config.frontend_url);
    let (session_id, mut session, jar) = load_or_create_session(state, jar, &origin)?;

    let auth_url = state.auth_flow.start_login(&mut session, &origin)?;
    if !state.sessions.update(&session_id, session) {
        tracing::warn!("Session ended before login state was stored");
    }

    Ok((jar, auth_url))
}

/// OAuth callback - validate state, exchange code for tokens.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let session_id = session_id_from_jar(&jar, &state.config.session_signing_key);
    let mut session = session_id
        .as_deref()
        .and_then(|id| state.sessions.get(id))
        .unwrap_or_default();

    let result = state.auth_flow.handle_callback(&mut session, &params).await;

    // A session logged out mid-exchange stays logged out
    if let Some(id) = &session_id {
        state.sessions.update(id, session);
    }

    match result {
        Ok(_) => Redirect::temporary(&state.config.frontend_url).into_response(),
        Err(err) => {
            tracing::warn!(code = err.code(), error = %err, "OAuth callback rejected");
            error_redirect(&state.config.frontend_url, &err).into_response()
        }
    }
}

/// Logout - drop the server-side session and expire the cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, StatusCode) {
    if let Some(id) = session_id_from_jar(&jar, &state.config.session_signing_key) {
        state.sessions.remove(&id);
        tracing::info!("Session logged out");
    }

    let secure = is_secure_origin(&request_origin(&headers, &state.config.frontend_url));
    (jar.add(session_removal_cookie(secure)), StatusCode::NO_CONTENT)
}

/// Send the browser back to the frontend with the error code and message.
fn error_redirect(frontend_url: &str, err: &AuthError) -> Redirect {
    let url = format!(
        "{}/?error={}&message={}",
        frontend_url.trim_end_matches('/'),
        err.code(),
        urlencoding::encode(&err.user_message())
    );
    Redirect::temporary(&url)
}

/// Look up the caller's session, or start a new anonymous one.
///
/// A new session comes with a cookie added to the returned jar.
fn load_or_create_session(
    state: &AppState,
    jar: CookieJar,
    origin: &str,
) -> Result<(String, AuthSession, CookieJar)> {
    if let Some(id) = session_id_from_jar(&jar, &state.config.session_signing_key) {
        if let Some(session) = state.sessions.get(&id) {
            return Ok((id, session, jar));
        }
    }

    let id = state.sessions.create()?;
    let token = create_session_token(&id, &state.config.session_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session token creation failed: {}", e)))?;
    let jar = jar.add(session_cookie(token, is_secure_origin(origin)));

    Ok((id, AuthSession::default(), jar))
}

/// Scheme and host the browser used to reach us.
fn request_origin(headers: &HeaderMap, fallback: &str) -> String {
    let Some(host) = headers.get(header::HOST).and_then(|h| h.to_str().ok()) else {
        return fallback.trim_end_matches('/').to_string();
    };

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}", scheme, host)
}

fn is_secure_origin(origin: &str) -> bool {
    origin.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_host(host: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_str(host).unwrap());
        headers
    }

    #[test]
    fn test_request_origin_localhost_is_http() {
        let origin = request_origin(&headers_with_host("localhost:8050"), "unused");
        assert_eq!(origin, "http://localhost:8050");
        assert!(!is_secure_origin(&origin));
    }

    #[test]
    fn test_request_origin_public_host_is_https() {
        let origin = request_origin(&headers_with_host("dashboard.example.com"), "unused");
        assert_eq!(origin, "https://dashboard.example.com");
        assert!(is_secure_origin(&origin));
    }

    #[test]
    fn test_request_origin_without_host_uses_fallback() {
        let origin = request_origin(&HeaderMap::new(), "https://dash.example.com/");
        assert_eq!(origin, "https://dash.example.com");
    }

    #[test]
    fn test_error_redirect_carries_code_and_message() {
        let redirect = error_redirect("http://localhost:8050", &AuthError::CsrfMismatch);
        let response = redirect.into_response();
        let location = response.headers().get(header::LOCATION).unwrap();

        assert_eq!(
            location,
            "http://localhost:8050/?error=security_error&message=Invalid%20state%20parameter"
        );
    }
}
