// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod session;
pub mod streams;
pub mod summary;

pub use activity::ActivityRecord;
pub use session::{AuthSession, AuthState, SessionAthlete, TokenSet};
pub use streams::{ActivityProfiles, StreamChannel, StreamData};
pub use summary::DashboardSummary;
