// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth authorization-code flow against Strava.
//!
//! `ANONYMOUS -> AWAITING_CALLBACK -> AUTHENTICATED`, with errors reported
//! through [`AuthError`]. The flow never owns session state: every operation
//! takes the caller's [`AuthSession`] by `&mut` and the caller persists it.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::config::CALLBACK_PATH;
use crate::error::{AuthError, StravaError};
use crate::models::AuthSession;
use crate::services::strava::StravaClient;

/// Bytes of entropy in each CSRF state token.
const STATE_BYTES: usize = 32;

/// Query parameters Strava sends to the callback path.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Outcome of [`AuthFlow::ensure_fresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// Stored token is still valid; nothing was done.
    Fresh,
    /// Token had expired and was replaced.
    Refreshed,
    /// No usable credentials; the user must log in.
    NotAuthenticated,
}

impl TokenStatus {
    pub fn is_authenticated(self) -> bool {
        !matches!(self, TokenStatus::NotAuthenticated)
    }
}

/// A Strava client bound to one session's access token.
#[derive(Clone)]
pub struct AuthenticatedClient {
    client: StravaClient,
    access_token: String,
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("client", &self.client)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl AuthenticatedClient {
    pub fn new(client: StravaClient, access_token: String) -> Self {
        Self {
            client,
            access_token,
        }
    }

    pub async fn list_activities(
        &self,
        after: i64,
        before: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<serde_json::Value>, StravaError> {
        self.client
            .list_activities(&self.access_token, after, before, page, per_page)
            .await
    }

    pub async fn get_activity(&self, activity_id: u64) -> Result<serde_json::Value, StravaError> {
        self.client
            .get_activity(&self.access_token, activity_id)
            .await
    }

    pub async fn get_activity_streams(
        &self,
        activity_id: u64,
    ) -> Result<serde_json::Value, StravaError> {
        self.client
            .get_activity_streams(&self.access_token, activity_id)
            .await
    }
}

/// Drives login, callback validation, code exchange and token refresh.
#[derive(Clone, Debug)]
pub struct AuthFlow {
    client: StravaClient,
}

impl AuthFlow {
    pub fn new(client: StravaClient) -> Self {
        Self { client }
    }

    /// Start a login attempt and return the Strava authorization URL.
    ///
    /// `origin` is the scheme and host the browser used to reach us; the
    /// redirect URI is `origin` + the callback path. A fresh state replaces
    /// any earlier one on the session.
    pub fn start_login(&self, session: &mut AuthSession, origin: &str) -> Result<String, AuthError> {
        let state = random_token(STATE_BYTES)?;
        let redirect_uri = format!("{}{}", origin.trim_end_matches('/'), CALLBACK_PATH);

        let auth_url = self.client.authorize_url(&redirect_uri, &state);
        session.oauth_state = Some(state);

        tracing::info!(redirect_uri = %redirect_uri, "Starting OAuth flow");
        Ok(auth_url)
    }

    /// Validate the provider callback and exchange the code for tokens.
    ///
    /// On success the session holds the new tokens, its state is cleared,
    /// and a ready-to-use client is returned.
    pub async fn handle_callback(
        &self,
        session: &mut AuthSession,
        params: &CallbackParams,
    ) -> Result<AuthenticatedClient, AuthError> {
        if let Some(error) = &params.error {
            tracing::warn!(error = %error, "OAuth error from Strava");
            return Err(AuthError::ProviderDenied(error.clone()));
        }

        if !state_matches(params.state.as_deref(), session.oauth_state.as_deref()) {
            tracing::warn!(
                received = params.state.is_some(),
                stored = session.oauth_state.is_some(),
                "OAuth state mismatch, rejecting callback"
            );
            return Err(AuthError::CsrfMismatch);
        }

        let code = params
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(AuthError::MissingCode)?;

        tracing::info!("Exchanging authorization code for tokens");

        let response = match self.client.exchange_code(code).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Strava token exchange failed");
                // A failed login leaves no tokens behind; the state stays so
                // the session remains in AWAITING_CALLBACK.
                session.clear_tokens();
                return Err(AuthError::TokenExchangeFailed(e.to_string()));
            }
        };

        let access_token = response.tokens.access_token.clone();
        session.store_tokens(response.tokens);
        session.athlete = response.athlete.map(Into::into);
        session.oauth_state = None;

        tracing::info!(
            athlete_id = session.athlete.as_ref().map(|a| a.id),
            "OAuth successful, tokens stored in session"
        );

        Ok(AuthenticatedClient::new(self.client.clone(), access_token))
    }

    /// Make sure the session's access token is usable, refreshing it if expired.
    ///
    /// Performs network I/O only when the token has expired. Never fails:
    /// a refresh error drops the stale tokens and reports `NotAuthenticated`.
    pub async fn ensure_fresh(&self, session: &mut AuthSession) -> TokenStatus {
        let now = chrono::Utc::now().timestamp();
        self.ensure_fresh_at(session, now).await
    }

    async fn ensure_fresh_at(&self, session: &mut AuthSession, now: i64) -> TokenStatus {
        let refresh_token = match (&session.refresh_token, session.is_expired_at(now)) {
            (Some(token), Some(true)) => token.clone(),
            (Some(_), Some(false)) => return TokenStatus::Fresh,
            _ => return TokenStatus::NotAuthenticated,
        };

        tracing::debug!("Access token expired, refreshing");

        match self.client.refresh_token(&refresh_token).await {
            Ok(tokens) => {
                session.store_tokens(tokens);
                tracing::info!(expires_at = session.expires_at, "Token refreshed");
                TokenStatus::Refreshed
            }
            Err(e) => {
                let err = AuthError::RefreshFailed(e.to_string());
                tracing::warn!(error = %err, "Dropping session tokens");
                session.clear_tokens();
                TokenStatus::NotAuthenticated
            }
        }
    }

    /// Return a client for the session if it is (or can be made) authenticated.
    pub async fn get_client(&self, session: &mut AuthSession) -> Option<AuthenticatedClient> {
        if !self.ensure_fresh(session).await.is_authenticated() {
            return None;
        }

        session
            .access_token
            .clone()
            .map(|token| AuthenticatedClient::new(self.client.clone(), token))
    }
}

/// Exact comparison of the callback state against the stored one.
///
/// Constant-time over the bytes; a missing value on either side never matches.
fn state_matches(received: Option<&str>, stored: Option<&str>) -> bool {
    match (received, stored) {
        (Some(received), Some(stored)) if !received.is_empty() => {
            received.as_bytes().ct_eq(stored.as_bytes()).into()
        }
        _ => false,
    }
}

/// Generate `len` random bytes, URL-safe base64 encoded without padding.
pub fn random_token(len: usize) -> Result<String, AuthError> {
    let mut bytes = vec![0u8; len];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AuthError::StateGeneration)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
