// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod auth;
pub mod session;
pub mod strava;

pub use activity::{ActivityFetcher, ActivityQuery, StreamCache};
pub use auth::{AuthFlow, AuthenticatedClient, CallbackParams, TokenStatus};
pub use session::SessionStore;
pub use strava::StravaClient;
