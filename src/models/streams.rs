// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-activity time series and the profiles derived from them.

use serde::Serialize;
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Channel name to samples, e.g. `"altitude" -> [12.0, 12.4, ...]`.
pub type StreamData = BTreeMap<String, Vec<f64>>;

/// Stream channels requested for the activity detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamChannel {
    Time,
    Distance,
    Altitude,
    VelocitySmooth,
    Heartrate,
}

impl StreamChannel {
    pub const ALL: [StreamChannel; 5] = [
        StreamChannel::Time,
        StreamChannel::Distance,
        StreamChannel::Altitude,
        StreamChannel::VelocitySmooth,
        StreamChannel::Heartrate,
    ];

    /// Strava's key for this channel.
    pub fn as_str(self) -> &'static str {
        match self {
            StreamChannel::Time => "time",
            StreamChannel::Distance => "distance",
            StreamChannel::Altitude => "altitude",
            StreamChannel::VelocitySmooth => "velocity_smooth",
            StreamChannel::Heartrate => "heartrate",
        }
    }

    /// Comma-separated `keys` parameter for the streams endpoint.
    pub fn request_keys() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One x/y series ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Distance-based profiles for the activity detail view.
///
/// A profile is present only when both of its channels were returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityProfiles {
    pub elevation: Option<Profile>,
    pub speed: Option<Profile>,
    pub heart_rate: Option<Profile>,
}

impl ActivityProfiles {
    pub fn from_streams(streams: &StreamData) -> Self {
        Self {
            elevation: distance_profile(
                streams,
                StreamChannel::Altitude,
                "Elevation Profile",
                "Elevation (m)",
            ),
            speed: distance_profile(
                streams,
                StreamChannel::VelocitySmooth,
                "Speed Profile",
                "Speed (m/s)",
            ),
            heart_rate: distance_profile(
                streams,
                StreamChannel::Heartrate,
                "Heart Rate Profile",
                "Heart Rate (bpm)",
            ),
        }
    }
}

fn distance_profile(
    streams: &StreamData,
    channel: StreamChannel,
    title: &str,
    y_label: &str,
) -> Option<Profile> {
    let x = streams.get(StreamChannel::Distance.as_str())?;
    let y = streams.get(channel.as_str())?;

    Some(Profile {
        title: title.to_string(),
        x_label: "Distance (m)".to_string(),
        y_label: y_label.to_string(),
        x: x.clone(),
        y: y.clone(),
    })
}
