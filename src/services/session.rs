// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory session store.

use dashmap::DashMap;
use std::sync::Arc;

use crate::config::DEFAULT_MAX_SESSIONS;
use crate::error::AuthError;
use crate::models::{AuthSession, AuthState};
use crate::services::auth::random_token;

/// Bytes of entropy in a session ID.
const SESSION_ID_BYTES: usize = 32;

/// Lifetime of a logged-in session (cookie, JWT and store entry).
pub const SESSION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Idle lifetime of a session that never finished logging in.
pub const PENDING_SESSION_TTL_SECS: i64 = 15 * 60;

#[derive(Clone)]
struct SessionEntry {
    session: AuthSession,
    last_seen: i64,
}

impl SessionEntry {
    fn is_authenticated(&self) -> bool {
        self.session.state() == AuthState::Authenticated
    }

    fn is_expired(&self, now: i64) -> bool {
        let ttl = if self.is_authenticated() {
            SESSION_TTL_SECS
        } else {
            PENDING_SESSION_TTL_SECS
        };
        now - self.last_seen >= ttl
    }
}

/// Process-wide map of session ID to OAuth session state.
///
/// Each session has a single writer (its own browser), so entries are
/// copied out, updated by the auth flow, and written back whole. Idle
/// entries are pruned whenever a new session is created, and the map never
/// holds more than `max_sessions` entries.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionEntry>>,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Create an empty (anonymous) session and return its ID.
    pub fn create(&self) -> Result<String, AuthError> {
        self.create_at(now())
    }

    fn create_at(&self, now: i64) -> Result<String, AuthError> {
        let pruned = self.prune_expired(now);
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned idle sessions");
        }
        while self.sessions.len() >= self.max_sessions {
            if !self.evict_one() {
                break;
            }
        }

        let id = random_token(SESSION_ID_BYTES)?;
        self.sessions.insert(
            id.clone(),
            SessionEntry {
                session: AuthSession::default(),
                last_seen: now,
            },
        );
        tracing::debug!("Session created");
        Ok(id)
    }

    /// Look up a live session, marking it as seen.
    pub fn get(&self, id: &str) -> Option<AuthSession> {
        self.get_at(id, now())
    }

    fn get_at(&self, id: &str, now: i64) -> Option<AuthSession> {
        let mut entry = self.sessions.get_mut(id)?;
        if entry.is_expired(now) {
            drop(entry);
            self.sessions.remove(id);
            return None;
        }
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    /// Write back a session that is still in the store.
    ///
    /// Returns `false` (and stores nothing) when the session was removed in
    /// the meantime, e.g. by a concurrent logout.
    pub fn update(&self, id: &str, session: AuthSession) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut entry) => {
                entry.session = session;
                entry.last_seen = now();
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &str) -> Option<AuthSession> {
        self.sessions.remove(id).map(|(_, entry)| entry.session)
    }

    /// Drop every session idle past its lifetime; returns how many went.
    pub fn prune_expired(&self, now: i64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.sessions.len())
    }

    /// Evict the least recently seen session, unfinished logins first.
    fn evict_one(&self) -> bool {
        let victim = self
            .sessions
            .iter()
            .min_by_key(|entry| (entry.is_authenticated(), entry.last_seen))
            .map(|entry| entry.key().clone());

        match victim {
            Some(id) => self.sessions.remove(&id).is_some(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
