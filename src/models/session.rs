// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-browser-session OAuth state.

use serde::{Deserialize, Serialize};

/// OAuth state for one user session.
///
/// Owned by the session store; the auth flow receives it by `&mut` and
/// the caller writes it back afterwards.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// CSRF state for the login attempt in flight (single use)
    pub oauth_state: Option<String>,
    /// Strava access token
    pub access_token: Option<String>,
    /// Strava refresh token
    pub refresh_token: Option<String>,
    /// Access token expiry (Unix timestamp, seconds)
    pub expires_at: Option<i64>,
    /// Athlete profile returned with the first token exchange
    pub athlete: Option<SessionAthlete>,
}

/// Athlete identity recorded at login, used for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAthlete {
    pub id: u64,
    pub firstname: String,
    pub lastname: String,
}

/// Where a session is in the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Anonymous,
    AwaitingCallback,
    Authenticated,
}

/// Token triple as returned by the Strava token endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AuthSession {
    /// Derive the login state from the stored fields.
    pub fn state(&self) -> AuthState {
        if self.access_token.is_some() && self.expires_at.is_some() {
            AuthState::Authenticated
        } else if self.oauth_state.is_some() {
            AuthState::AwaitingCallback
        } else {
            AuthState::Anonymous
        }
    }

    /// Overwrite all three token fields at once.
    pub fn store_tokens(&mut self, tokens: TokenSet) {
        self.access_token = Some(tokens.access_token);
        self.refresh_token = Some(tokens.refresh_token);
        self.expires_at = Some(tokens.expires_at);
    }

    /// Drop all token fields (and the athlete they belonged to).
    pub fn clear_tokens(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.expires_at = None;
        self.athlete = None;
    }

    /// Whether the stored access token has expired at `now` (Unix seconds).
    ///
    /// Returns `None` when no expiry is recorded.
    pub fn is_expired_at(&self, now: i64) -> Option<bool> {
        self.expires_at.map(|expires_at| expires_at <= now)
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(value: &Option<String>) -> Option<&'static str> {
            value.as_ref().map(|_| "<redacted>")
        }

        f.debug_struct("AuthSession")
            .field("oauth_state", &redact(&self.oauth_state))
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .field("athlete", &self.athlete)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(expires_at: i64) -> TokenSet {
        TokenSet {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_new_session_is_anonymous() {
        assert_eq!(AuthSession::default().state(), AuthState::Anonymous);
    }

    #[test]
    fn test_state_transitions() {
        let mut session = AuthSession {
            oauth_state: Some("abc".to_string()),
            ..Default::default()
        };
        assert_eq!(session.state(), AuthState::AwaitingCallback);

        session.store_tokens(tokens(1_700_000_000));
        session.oauth_state = None;
        assert_eq!(session.state(), AuthState::Authenticated);

        session.clear_tokens();
        assert_eq!(session.state(), AuthState::Anonymous);
        assert!(session.refresh_token.is_none());
    }

    #[test]
    fn test_store_tokens_keeps_expiry_with_access_token() {
        let mut session = AuthSession::default();
        session.store_tokens(tokens(42));
        assert!(session.access_token.is_some());
        assert_eq!(session.expires_at, Some(42));
    }

    #[test]
    fn test_expiry_boundary_counts_as_expired() {
        let mut session = AuthSession::default();
        assert_eq!(session.is_expired_at(100), None);

        session.store_tokens(tokens(100));
        assert_eq!(session.is_expired_at(99), Some(false));
        assert_eq!(session.is_expired_at(100), Some(true));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let mut session = AuthSession {
            oauth_state: Some("state_value".to_string()),
            ..Default::default()
        };
        session.store_tokens(TokenSet {
            access_token: "secret_access".to_string(),
            refresh_token: "secret_refresh".to_string(),
            expires_at: 1,
        });

        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("secret_access"));
        assert!(!rendered.contains("secret_refresh"));
        assert!(!rendered.contains("state_value"));
    }
}
