//! Feed service: the capped in-memory disruption list and the live ticker.
//!
//! DESIGN
//! ======
//! `FeedStore` keeps records newest-first in a `VecDeque` and never grows
//! past its capacity: every insert truncates the tail. Ids come from a
//! monotonically increasing sequence so evicting old records can never cause
//! a new record to reuse an id.
//!
//! The live ticker sleeps a random interval between the configured bounds,
//! samples one record, prepends it, broadcasts `disruption:update`, and hands
//! the record to the alert desk. Ordering across concurrent writers (ticker,
//! upstream relay) is plain last-write-wins on the prepend.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::FeedTiming;
use crate::frame::{Data, Frame};
use crate::model::Disruption;
use crate::services::{alert, hub, mock};
use crate::state::AppState;

/// Older records kept when an upstream batch is merged on top.
pub const UPSTREAM_KEEP_PREVIOUS: usize = 100;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("disruption not found: {0}")]
    NotFound(String),
}

impl crate::frame::ErrorCode for FeedError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_DISRUPTION_NOT_FOUND",
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug)]
pub struct FeedStore {
    records: VecDeque<Disruption>,
    capacity: usize,
    next_seq: u64,
}

impl FeedStore {
    /// A zero capacity is bumped to one so the store can always hold the
    /// latest record.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { records: VecDeque::with_capacity(capacity), capacity, next_seq: 1 }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the contents with `records` (assumed newest-first).
    pub fn seed(&mut self, records: Vec<Disruption>) {
        let highest = records.iter().filter_map(|d| id_sequence(&d.id)).max().unwrap_or(0);
        self.next_seq = self.next_seq.max(highest + 1);
        self.records = records.into();
        self.records.truncate(self.capacity);
    }

    /// Reserve the next record sequence number.
    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Prepend one record and evict from the tail past capacity.
    pub fn push_front(&mut self, disruption: Disruption) {
        if let Some(seq) = id_sequence(&disruption.id) {
            self.next_seq = self.next_seq.max(seq + 1);
        }
        self.records.push_front(disruption);
        self.records.truncate(self.capacity);
    }

    /// Prepend an upstream batch, keeping at most `keep_previous` of the
    /// records that were already here. Capacity still applies.
    pub fn merge_front(&mut self, batch: Vec<Disruption>, keep_previous: usize) {
        let mut previous = std::mem::take(&mut self.records);
        previous.truncate(keep_previous);

        for d in &batch {
            if let Some(seq) = id_sequence(&d.id) {
                self.next_seq = self.next_seq.max(seq + 1);
            }
        }

        let mut merged: VecDeque<Disruption> = batch.into();
        merged.extend(previous);
        merged.truncate(self.capacity);
        self.records = merged;
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Disruption> {
        self.records.iter().find(|d| d.id == id)
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Disruption> {
        self.records.front()
    }

    /// Owned copy of every record, newest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Disruption> {
        self.records.iter().cloned().collect()
    }
}

/// Parse the numeric suffix of a `disruption-{n}` id.
fn id_sequence(id: &str) -> Option<u64> {
    id.strip_prefix("disruption-")?.parse().ok()
}

// =============================================================================
// LIVE TICKER
// =============================================================================

/// Spawn the simulated live feed. Returns a handle for shutdown.
pub fn spawn_feed_task(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let timing = state.config.feed;
        tokio::time::sleep(timing.startup_delay).await;

        loop {
            let wait = next_interval(&mut rand::rng(), timing);
            tokio::time::sleep(wait).await;

            let disruption = inject_random(&state).await;
            info!(
                id = %disruption.id,
                kind = %disruption.kind,
                location = %disruption.location_name,
                severity = disruption.severity.as_str(),
                "feed: new disruption"
            );
        }
    })
}

/// Uniform random wait in `[min_interval, max_interval]`.
pub fn next_interval<R: Rng + ?Sized>(rng: &mut R, timing: FeedTiming) -> Duration {
    let min = u64::try_from(timing.min_interval.as_millis()).unwrap_or(u64::MAX);
    let max = u64::try_from(timing.max_interval.as_millis()).unwrap_or(u64::MAX);
    if min >= max {
        return timing.min_interval;
    }
    Duration::from_millis(rng.random_range(min..=max))
}

/// Sample one fresh record stamped now and publish it.
pub async fn inject_random(state: &AppState) -> Disruption {
    let disruption = {
        let mut feed = state.feed.write().await;
        let seq = feed.next_seq();
        mock::sample_disruption(&mut rand::rng(), seq, Utc::now(), 0)
    };
    publish(state, disruption.clone()).await;
    disruption
}

/// Prepend a record, broadcast it to every websocket client, and raise an
/// alert for it.
pub async fn publish(state: &AppState, disruption: Disruption) {
    state.feed.write().await.push_front(disruption.clone());
    hub::broadcast(state, &update_frame(&disruption), None).await;
    alert::process(state, &disruption).await;
}

/// Look up one record by id.
///
/// # Errors
///
/// Returns `FeedError::NotFound` if the id is not in the feed (never
/// generated, or already evicted).
pub async fn find(state: &AppState, id: &str) -> Result<Disruption, FeedError> {
    state
        .feed
        .read()
        .await
        .get(id)
        .cloned()
        .ok_or_else(|| FeedError::NotFound(id.to_string()))
}

/// `disruption:update` push frame.
#[must_use]
pub fn update_frame(disruption: &Disruption) -> Frame {
    let mut data = Data::new();
    data.insert("disruption".into(), serde_json::to_value(disruption).unwrap_or_default());
    Frame::request("disruption:update", data).with_from("feed")
}

#[cfg(test)]
#[path = "feed_test.rs"]
mod tests;
