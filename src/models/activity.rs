// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Normalized activity record for the dashboard.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use serde_json::Value;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Placeholder rendered for metrics Strava did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// One activity from the athlete's list, rebuilt on every fetch.
///
/// `id`, `name`, `activity_type` and `start_date` are always present. Every
/// metric is independently optional and serializes as `"N/A"` when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityRecord {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Local start time as reported by Strava (`start_date_local`)
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub start_date: NaiveDateTime,
    #[serde(serialize_with = "or_na")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string"))]
    pub kudos: Option<u64>,
    /// Meters
    #[serde(serialize_with = "or_na")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string"))]
    pub distance: Option<f64>,
    /// Seconds
    #[serde(serialize_with = "or_na")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string"))]
    pub moving_time: Option<f64>,
    /// Seconds
    #[serde(serialize_with = "or_na")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string"))]
    pub elapsed_time: Option<f64>,
    /// Meters
    #[serde(serialize_with = "or_na")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string"))]
    pub total_elevation_gain: Option<f64>,
    /// Meters per second
    #[serde(serialize_with = "or_na")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string"))]
    pub average_speed: Option<f64>,
    #[serde(serialize_with = "or_na")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string"))]
    pub max_speed: Option<f64>,
    #[serde(serialize_with = "or_na")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string"))]
    pub average_watts: Option<f64>,
    #[serde(serialize_with = "or_na")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string"))]
    pub max_watts: Option<f64>,
    #[serde(serialize_with = "or_na")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string"))]
    pub average_heartrate: Option<f64>,
    #[serde(serialize_with = "or_na")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | string"))]
    pub max_heartrate: Option<f64>,
}

/// Why a provider record could not be turned into an [`ActivityRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("missing or invalid field `{0}`")]
    MissingField(&'static str),
}

impl ActivityRecord {
    /// Build a record from one element of Strava's activity list.
    ///
    /// Only the identifying fields can fail; a metric that is missing, null,
    /// or not a number becomes `None`.
    pub fn from_provider(raw: &Value) -> Result<Self, RecordError> {
        let id = raw
            .get("id")
            .and_then(Value::as_u64)
            .ok_or(RecordError::MissingField("id"))?;
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .ok_or(RecordError::MissingField("name"))?
            .to_string();
        let activity_type = raw
            .get("type")
            .or_else(|| raw.get("sport_type"))
            .and_then(Value::as_str)
            .ok_or(RecordError::MissingField("type"))?
            .to_string();
        let start_date = raw
            .get("start_date_local")
            .and_then(Value::as_str)
            .and_then(parse_local_timestamp)
            .ok_or(RecordError::MissingField("start_date_local"))?;

        let metric = |key: &str| raw.get(key).and_then(Value::as_f64);

        Ok(Self {
            id,
            name,
            activity_type,
            start_date,
            kudos: raw.get("kudos_count").and_then(Value::as_u64),
            distance: metric("distance"),
            moving_time: metric("moving_time"),
            elapsed_time: metric("elapsed_time"),
            total_elevation_gain: metric("total_elevation_gain"),
            average_speed: metric("average_speed"),
            max_speed: metric("max_speed"),
            average_watts: metric("average_watts"),
            max_watts: metric("max_watts"),
            average_heartrate: metric("average_heartrate"),
            max_heartrate: metric("max_heartrate"),
        })
    }
}

/// Parse Strava's `start_date_local`.
///
/// Strava appends a `Z` even though the value is wall-clock local time, so
/// the offset is discarded.
fn parse_local_timestamp(raw: &str) -> Option<NaiveDateTime> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn or_na<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}
