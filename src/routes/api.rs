// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::CurrentSession;
use crate::models::{
    ActivityProfiles, ActivityRecord, AuthState, DashboardSummary, SessionAthlete, StreamData,
};
use crate::services::{ActivityQuery, AuthenticatedClient};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Upper bound on `limit` for a single dashboard fetch.
const MAX_LIMIT: usize = 1000;

/// Rows shown in the recent-activities table.
const PREVIEW_ROWS: usize = 10;

/// API routes (require an authenticated session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/activities", get(get_activities))
        .route("/api/activities/{id}", get(get_activity_detail))
}

// ─── Session ─────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub state: AuthState,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub expires_at: Option<i64>,
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub athlete: Option<SessionAthlete>,
}

/// Current login status (never exposes tokens).
async fn get_me(Extension(current): Extension<CurrentSession>) -> Json<MeResponse> {
    Json(MeResponse {
        state: current.session.state(),
        expires_at: current.session.expires_at,
        athlete: current.session.athlete,
    })
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Maximum number of activities
    limit: Option<usize>,
    /// Window start (Unix timestamp)
    after: Option<i64>,
    /// Window end (Unix timestamp)
    before: Option<i64>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardResponse {
    /// False when Strava could not be reached; lists are then empty.
    pub available: bool,
    pub activities: Vec<ActivityRecord>,
    pub summary: DashboardSummary,
    /// The first rows of `activities`, for the recent-activities table
    pub preview: Vec<ActivityRecord>,
}

fn parse_timestamp(name: &str, raw: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    raw.map(|ts| {
        DateTime::from_timestamp(ts, 0).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid '{}' parameter: out of range", name))
        })
    })
    .transpose()
}

fn build_query(params: &ActivitiesQuery, default_limit: usize) -> Result<ActivityQuery> {
    let limit = params.limit.unwrap_or(default_limit);
    if limit == 0 {
        return Err(AppError::BadRequest(
            "'limit' must be greater than 0".to_string(),
        ));
    }

    let after = parse_timestamp("after", params.after)?;
    let before = parse_timestamp("before", params.before)?;
    if let (Some(after), Some(before)) = (after, before) {
        if after >= before {
            return Err(AppError::BadRequest(
                "'after' must be earlier than 'before'".to_string(),
            ));
        }
    }

    Ok(ActivityQuery {
        limit: limit.min(MAX_LIMIT),
        after,
        before,
    })
}

/// Activities for the dashboard, with summary statistics.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<AuthenticatedClient>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<DashboardResponse>> {
    let query = build_query(&params, state.config.activity_limit)?;

    let Some(activities) = state.activities.fetch_activities(&client, query).await else {
        return Ok(Json(DashboardResponse {
            available: false,
            activities: Vec::new(),
            summary: DashboardSummary::default(),
            preview: Vec::new(),
        }));
    };

    let summary = DashboardSummary::from_records(&activities);
    let preview = activities.iter().take(PREVIEW_ROWS).cloned().collect();

    Ok(Json(DashboardResponse {
        available: true,
        activities,
        summary,
        preview,
    }))
}

// ─── Activity Detail ─────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityDetailResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub activity_id: u64,
    /// Activity name for the heading, when Strava returned the record
    pub name: Option<String>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, number[]>"))]
    pub streams: StreamData,
    pub profiles: ActivityProfiles,
}

/// Stream data and derived profiles for one activity.
async fn get_activity_detail(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<AuthenticatedClient>,
    Path(activity_id): Path<u64>,
) -> Json<ActivityDetailResponse> {
    let (activity, streams) = tokio::join!(
        state.activities.fetch_activity(&client, activity_id),
        state.activities.fetch_streams(&client, activity_id),
    );
    let name = activity.map(|a| a.name);

    let response = match streams {
        Some(streams) => ActivityDetailResponse {
            activity_id,
            name,
            available: true,
            message: None,
            profiles: ActivityProfiles::from_streams(&streams),
            streams: streams.as_ref().clone(),
        },
        None => ActivityDetailResponse {
            activity_id,
            name,
            available: false,
            message: Some("No detailed data available for this activity".to_string()),
            streams: StreamData::new(),
            profiles: ActivityProfiles::default(),
        },
    };

    Json(response)
}
