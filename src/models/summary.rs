// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary statistics for the dashboard header and type chart.
//!
//! Computed from the records of a single fetch; nothing is persisted.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::ActivityRecord;

/// Number of activity types listed in the summary line.
const TOP_TYPES: usize = 5;

/// Activity count for one type (one bar in the type chart).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub count: u32,
}

/// Aggregates over one fetched activity window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardSummary {
    pub total_activities: u32,
    /// Counts per type, most frequent first (ties by name)
    pub activities_by_type: Vec<TypeCount>,
    /// The most frequent type names
    pub top_types: Vec<String>,
    /// Earliest `start_date` in the window
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub first_start_date: Option<NaiveDateTime>,
    /// Latest `start_date` in the window
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub last_start_date: Option<NaiveDateTime>,
}

impl DashboardSummary {
    pub fn from_records(records: &[ActivityRecord]) -> Self {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for record in records {
            *counts.entry(record.activity_type.as_str()).or_insert(0) += 1;
        }

        let mut activities_by_type: Vec<TypeCount> = counts
            .into_iter()
            .map(|(activity_type, count)| TypeCount {
                activity_type: activity_type.to_string(),
                count,
            })
            .collect();
        activities_by_type.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.activity_type.cmp(&b.activity_type))
        });

        let top_types = activities_by_type
            .iter()
            .take(TOP_TYPES)
            .map(|t| t.activity_type.clone())
            .collect();

        Self {
            total_activities: records.len() as u32,
            activities_by_type,
            top_types,
            first_start_date: records.iter().map(|r| r.start_date).min(),
            last_start_date: records.iter().map(|r| r.start_date).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_record(id: u64, activity_type: &str, day: u32) -> ActivityRecord {
        ActivityRecord {
            id,
            name: format!("Test Activity {}", id),
            activity_type: activity_type.to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            kudos: None,
            distance: Some(1000.0),
            moving_time: None,
            elapsed_time: None,
            total_elevation_gain: None,
            average_speed: None,
            max_speed: None,
            average_watts: None,
            max_watts: None,
            average_heartrate: None,
            max_heartrate: None,
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = DashboardSummary::from_records(&[]);
        assert_eq!(summary.total_activities, 0);
        assert!(summary.activities_by_type.is_empty());
        assert!(summary.first_start_date.is_none());
    }

    #[test]
    fn test_counts_ordered_by_frequency() {
        let records = vec![
            make_record(1, "Run", 3),
            make_record(2, "Ride", 1),
            make_record(3, "Run", 9),
            make_record(4, "Hike", 5),
        ];

        let summary = DashboardSummary::from_records(&records);

        assert_eq!(summary.total_activities, 4);
        assert_eq!(
            summary.activities_by_type[0],
            TypeCount {
                activity_type: "Run".to_string(),
                count: 2
            }
        );
        // Ties are broken by name
        assert_eq!(summary.top_types, vec!["Run", "Hike", "Ride"]);
        assert_eq!(summary.first_start_date, Some(records[1].start_date));
        assert_eq!(summary.last_start_date, Some(records[2].start_date));
    }

    #[test]
    fn test_top_types_capped_at_five() {
        let records: Vec<ActivityRecord> = ["Run", "Ride", "Hike", "Swim", "Walk", "Yoga"]
            .iter()
            .enumerate()
            .map(|(i, t)| make_record(i as u64, t, 1))
            .collect();

        let summary = DashboardSummary::from_records(&records);
        assert_eq!(summary.activities_by_type.len(), 6);
        assert_eq!(summary.top_types.len(), 5);
    }
}
