// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie handling and the authentication middleware.

use crate::error::AppError;
use crate::models::AuthSession;
use crate::services::session::SESSION_TTL_SECS;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the cookie carrying the signed session ID.
pub const SESSION_COOKIE: &str = "strava_dashboard_session";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (session ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Session that passed the auth middleware, available to protected handlers.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: String,
    pub session: AuthSession,
}

/// Middleware that requires a logged-in session with a usable token.
///
/// Runs the token freshness check, writes the session back (it may have been
/// refreshed or cleared), and exposes the authenticated client to handlers.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session_id =
        session_id_from_jar(&jar, &state.config.session_signing_key).ok_or(AppError::Unauthorized)?;
    let mut session = state
        .sessions
        .get(&session_id)
        .ok_or(AppError::Unauthorized)?;

    let client = state.auth_flow.get_client(&mut session).await;
    if !state.sessions.update(&session_id, session.clone()) {
        tracing::info!("Session ended during request");
        return Err(AppError::Unauthorized);
    }

    let client = client.ok_or_else(|| {
        tracing::info!("Session not authenticated, login required");
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(client);
    request.extensions_mut().insert(CurrentSession {
        id: session_id,
        session,
    });

    Ok(next.run(request).await)
}

/// Extract and verify the session ID from the request cookies.
pub fn session_id_from_jar(jar: &CookieJar, signing_key: &[u8]) -> Option<String> {
    let token = jar.get(SESSION_COOKIE)?.value().to_string();
    decode_session_token(&token, signing_key)
}

/// Verify a session JWT and return the session ID it carries.
pub fn decode_session_token(token: &str, signing_key: &[u8]) -> Option<String> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    match decode::<Claims>(token, &key, &validation) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session cookie");
            None
        }
    }
}

/// Create a signed JWT for a session ID.
pub fn create_session_token(session_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: session_id.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Build the session cookie.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS))
        .build()
}

/// Build a cookie that removes the session cookie (matching path and flags).
pub fn session_removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie
}
