// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity fetching service.
//!
//! Handles:
//! 1. Paging through the athlete's activity list for a date window
//! 2. Normalizing each provider record into an `ActivityRecord`
//! 3. Fetching per-activity streams through a bounded LRU cache
//!
//! Failures here degrade: the caller gets `None` and the cause is logged.

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{MAX_ACTIVITY_WINDOW_DAYS, MAX_STREAM_CACHE_CAPACITY};
use crate::models::{ActivityRecord, StreamData};
use crate::services::auth::AuthenticatedClient;
use crate::services::strava::MAX_PER_PAGE;

/// Default look-back window when no `after` bound is given.
pub const DEFAULT_WINDOW_DAYS: i64 = 90;

/// Default number of activities per fetch.
pub const DEFAULT_LIMIT: usize = 100;

/// Bounds for an activity list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityQuery {
    pub limit: usize,
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            after: None,
            before: None,
        }
    }
}

impl ActivityQuery {
    /// Resolve missing bounds: `before` defaults to `now`, `after` to
    /// `window_days` before `now`.
    pub fn window(&self, now: DateTime<Utc>, window_days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let before = self.before.unwrap_or(now);
        let after = self.after.unwrap_or(now - Duration::days(window_days));
        (after, before)
    }
}

/// Process-wide stream cache keyed by activity ID.
///
/// Readers share a read lock and only promote an entry when the write lock is
/// immediately available, so lookups never wait on each other.
#[derive(Clone)]
pub struct StreamCache {
    store: Arc<RwLock<LruCache<u64, Arc<StreamData>>>>,
    capacity: NonZeroUsize,
}

impl StreamCache {
    /// Create a cache holding at most `capacity` activities (clamped to 1..=100).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.min(MAX_STREAM_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            capacity,
        }
    }

    pub async fn get(&self, activity_id: u64) -> Option<Arc<StreamData>> {
        let hit = self.store.read().await.peek(&activity_id).cloned();

        if hit.is_some() {
            if let Ok(mut store) = self.store.try_write() {
                store.promote(&activity_id);
            }
        }

        hit
    }

    pub async fn insert(&self, activity_id: u64, streams: Arc<StreamData>) {
        self.store.write().await.put(activity_id, streams);
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, activity_id: u64) -> bool {
        self.store.read().await.contains(&activity_id)
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

impl Default for StreamCache {
    fn default() -> Self {
        Self::new(MAX_STREAM_CACHE_CAPACITY)
    }
}

/// Fetches and normalizes activity data for the dashboard.
#[derive(Clone)]
pub struct ActivityFetcher {
    cache: StreamCache,
    window_days: i64,
}

impl ActivityFetcher {
    /// `window_days` is clamped to `1..=MAX_ACTIVITY_WINDOW_DAYS`.
    pub fn new(cache: StreamCache, window_days: i64) -> Self {
        Self {
            cache,
            window_days: window_days.clamp(1, MAX_ACTIVITY_WINDOW_DAYS),
        }
    }

    pub fn cache(&self) -> &StreamCache {
        &self.cache
    }

    /// Fetch up to `query.limit` activities in the query window, newest first.
    ///
    /// Returns `None` when a list request fails. Records missing an
    /// identifying field are skipped; missing metrics become `N/A`.
    pub async fn fetch_activities(
        &self,
        client: &AuthenticatedClient,
        query: ActivityQuery,
    ) -> Option<Vec<ActivityRecord>> {
        let (after, before) = query.window(Utc::now(), self.window_days);
        let limit = query.limit;

        tracing::info!(%after, %before, limit, "Fetching activities");

        let per_page = (limit.min(MAX_PER_PAGE as usize) as u32).max(1);
        let mut records = Vec::with_capacity(limit);
        let mut page = 1u32;

        while records.len() < limit {
            let raw = match client
                .list_activities(after.timestamp(), before.timestamp(), page, per_page)
                .await
            {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::error!(error = %e, page, "Error fetching activities");
                    return None;
                }
            };

            let page_len = raw.len();
            let remaining = limit - records.len();
            records.extend(raw.iter().filter_map(normalize_record).take(remaining));

            if page_len < per_page as usize {
                break;
            }
            page += 1;
        }

        tracing::info!(count = records.len(), "Successfully fetched activities");
        Some(records)
    }

    /// Fetch a single activity record, for the detail view heading.
    ///
    /// Returns `None` when the request fails or the record is malformed.
    pub async fn fetch_activity(
        &self,
        client: &AuthenticatedClient,
        activity_id: u64,
    ) -> Option<ActivityRecord> {
        match client.get_activity(activity_id).await {
            Ok(raw) => normalize_record(&raw),
            Err(e) => {
                tracing::error!(error = %e, activity_id, "Error fetching activity");
                None
            }
        }
    }

    /// Fetch the detail-view streams for one activity, using the cache.
    ///
    /// Returns `None` when the request fails or nothing usable came back.
    /// Channels that are missing or not numeric are left out.
    pub async fn fetch_streams(
        &self,
        client: &AuthenticatedClient,
        activity_id: u64,
    ) -> Option<Arc<StreamData>> {
        if let Some(cached) = self.cache.get(activity_id).await {
            tracing::debug!(activity_id, "Stream cache hit");
            return Some(cached);
        }

        let raw = match client.get_activity_streams(activity_id).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, activity_id, "Error fetching streams for activity");
                return None;
            }
        };

        let streams = parse_streams(&raw, activity_id);
        if streams.is_empty() {
            tracing::info!(activity_id, "No stream data available for activity");
            return None;
        }

        let streams = Arc::new(streams);
        self.cache.insert(activity_id, streams.clone()).await;
        Some(streams)
    }
}

fn normalize_record(raw: &Value) -> Option<ActivityRecord> {
    match ActivityRecord::from_provider(raw) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(
                error = %e,
                id = ?raw.get("id"),
                "Skipping malformed activity record"
            );
            None
        }
    }
}

/// Convert Strava's stream payload into channel -> samples.
///
/// Accepts both the `key_by_type` object form and the plain array form.
fn parse_streams(raw: &Value, activity_id: u64) -> StreamData {
    let entries: Vec<(&str, &Value)> = match raw {
        Value::Object(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| Some((item.get("type")?.as_str()?, item)))
            .collect(),
        _ => Vec::new(),
    };

    let mut streams = StreamData::new();
    for (channel, stream) in entries {
        match parse_samples(stream) {
            Some(samples) => {
                streams.insert(channel.to_string(), samples);
            }
            None => {
                tracing::warn!(activity_id, channel, "Could not process stream");
            }
        }
    }
    streams
}

fn parse_samples(stream: &Value) -> Option<Vec<f64>> {
    stream
        .get("data")?
        .as_array()?
        .iter()
        .map(Value::as_f64)
        .collect()
}
