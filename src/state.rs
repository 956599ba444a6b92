//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor and
//! cloned into every background task. It holds the in-memory disruption feed,
//! the websocket client registry, the simulated agent board, the alert desk,
//! REST chat sessions, the upstream connection status, and the chat rate
//! limiter. Nothing here is persisted; a restart regenerates everything.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::frame::Frame;
use crate::rate_limit::RateLimiter;
use crate::services::agents::AgentBoard;
use crate::services::alert::AlertDesk;
use crate::services::chatbot::ChatSessions;
use crate::services::feed::FeedStore;

// =============================================================================
// UPSTREAM STATUS
// =============================================================================

/// Connection status shown by dashboards as the "Live" / "Offline" badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamStatus {
    /// No upstream configured; serving mock data only.
    Disabled,
    Connecting,
    Online,
    Offline,
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub feed: Arc<RwLock<FeedStore>>,
    /// Connected websocket clients: `client_id` -> sender for outgoing frames.
    pub clients: Arc<RwLock<HashMap<Uuid, mpsc::Sender<Frame>>>>,
    pub agents: Arc<RwLock<AgentBoard>>,
    pub alerts: Arc<RwLock<AlertDesk>>,
    pub chats: Arc<RwLock<ChatSessions>>,
    pub upstream: Arc<RwLock<UpstreamStatus>>,
    /// In-memory rate limiter for chat messages.
    pub rate_limiter: RateLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let upstream = if config.upstream.api_url.is_some() || config.upstream.ws_url.is_some() {
            UpstreamStatus::Connecting
        } else {
            UpstreamStatus::Disabled
        };
        Self {
            feed: Arc::new(RwLock::new(FeedStore::new(config.feed_capacity))),
            clients: Arc::new(RwLock::new(HashMap::new())),
            agents: Arc::new(RwLock::new(AgentBoard::new())),
            alerts: Arc::new(RwLock::new(AlertDesk::new())),
            chats: Arc::new(RwLock::new(ChatSessions::new())),
            upstream: Arc::new(RwLock::new(upstream)),
            rate_limiter: RateLimiter::new(),
            config: Arc::new(config),
        }
    }

    pub async fn set_upstream_status(&self, status: UpstreamStatus) {
        *self.upstream.write().await = status;
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::model::{Disruption, DisruptionStatus, Region, Severity};
    use crate::services::mock;

    /// Config with all timers collapsed so tests never sleep for long.
    #[must_use]
    pub fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.feed_capacity = 50;
        config.feed.startup_delay = Duration::ZERO;
        config.feed.min_interval = Duration::from_millis(1);
        config.feed.max_interval = Duration::from_millis(2);
        config.search_debounce = Duration::from_millis(40);
        config.chat_delay_min = Duration::ZERO;
        config.chat_delay_max = Duration::ZERO;
        config
    }

    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(test_config())
    }

    /// Seed `count` deterministic mock records into the feed.
    pub async fn seed_feed(state: &AppState, count: usize) -> Vec<Disruption> {
        let mut rng = StdRng::seed_from_u64(42);
        let now = Utc.with_ymd_and_hms(2026, 5, 12, 12, 0, 0).unwrap();
        let records = mock::generate_disruptions(&mut rng, count, now);
        state.feed.write().await.seed(records.clone());
        records
    }

    /// Hand-built record for assertions that need exact field values.
    #[must_use]
    pub fn disruption(id: &str, severity: Severity, description: &str) -> Disruption {
        Disruption {
            id: id.into(),
            kind: "Port Congestion".into(),
            location: [121.47, 31.23],
            location_name: "Shanghai".into(),
            region: Region::AsiaPacific,
            severity,
            status: DisruptionStatus::Active,
            confidence: 0.88,
            affected_routes: 7,
            timestamp: Utc.with_ymd_and_hms(2026, 5, 12, 9, 0, 0).unwrap(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
