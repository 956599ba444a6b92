//! In-memory rate limiting for chat messages.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<Uuid, VecDeque<Instant>>`.
//! Two limits are enforced on every chat message, REST or websocket:
//! - Per-client: 10 messages/min (keyed by websocket client id or chat
//!   session id)
//! - Global: 60 messages/min across all clients
//!
//! Both are overridable via `CHAT_RATE_LIMIT_*` environment variables.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::config::env_parse;

const DEFAULT_PER_CLIENT_LIMIT: usize = 10;
const DEFAULT_PER_CLIENT_WINDOW_SECS: u64 = 60;

const DEFAULT_GLOBAL_LIMIT: usize = 60;
const DEFAULT_GLOBAL_WINDOW_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_client_limit: usize,
    pub per_client_window: Duration,
    pub global_limit: usize,
    pub global_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_client_limit: DEFAULT_PER_CLIENT_LIMIT,
            per_client_window: Duration::from_secs(DEFAULT_PER_CLIENT_WINDOW_SECS),
            global_limit: DEFAULT_GLOBAL_LIMIT,
            global_window: Duration::from_secs(DEFAULT_GLOBAL_WINDOW_SECS),
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let per_client_window_secs =
            env_parse("CHAT_RATE_LIMIT_PER_CLIENT_WINDOW_SECS", DEFAULT_PER_CLIENT_WINDOW_SECS);
        let global_window_secs = env_parse("CHAT_RATE_LIMIT_GLOBAL_WINDOW_SECS", DEFAULT_GLOBAL_WINDOW_SECS);

        Self {
            per_client_limit: env_parse("CHAT_RATE_LIMIT_PER_CLIENT", DEFAULT_PER_CLIENT_LIMIT),
            per_client_window: Duration::from_secs(per_client_window_secs),
            global_limit: env_parse("CHAT_RATE_LIMIT_GLOBAL", DEFAULT_GLOBAL_LIMIT),
            global_window: Duration::from_secs(global_window_secs),
        }
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum RateLimitError {
    #[error("per-client rate limit exceeded (max {limit} messages/{window_secs}s)")]
    PerClientExceeded { limit: usize, window_secs: u64 },
    #[error("global rate limit exceeded (max {limit} messages/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
}

impl crate::frame::ErrorCode for RateLimitError {
    fn error_code(&self) -> &'static str {
        "E_RATE_LIMITED"
    }

    fn retryable(&self) -> bool {
        true
    }
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
    config: RateLimitConfig,
}

#[derive(Default)]
struct RateLimiterInner {
    /// Per-client message timestamps.
    client_requests: HashMap<Uuid, VecDeque<Instant>>,
    /// Global message timestamps.
    global_requests: VecDeque<Instant>,
    /// When idle client windows were last swept out of `client_requests`.
    last_sweep: Option<Instant>,
}

impl RateLimiter {
    /// Limits read from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: RateLimitConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(RateLimiterInner::default())), config }
    }

    #[must_use]
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Check both per-client and global rate limits, then record the message.
    ///
    /// # Errors
    ///
    /// Returns the first limit that would be exceeded; nothing is recorded
    /// in that case.
    pub fn check_and_record(&self, client_id: Uuid) -> Result<(), RateLimitError> {
        self.check_and_record_at(client_id, Instant::now())
    }

    /// Check + record with an explicit timestamp.
    pub(crate) fn check_and_record_at(&self, client_id: Uuid, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;

        prune_window(&mut inner.global_requests, now, cfg.global_window);
        if inner.global_requests.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }

        let sweep_due = inner
            .last_sweep
            .is_none_or(|at| now.saturating_duration_since(at) >= cfg.per_client_window);
        if sweep_due {
            inner.client_requests.retain(|_, deque| {
                prune_window(deque, now, cfg.per_client_window);
                !deque.is_empty()
            });
            inner.last_sweep = Some(now);
        }

        let client_deque = inner.client_requests.entry(client_id).or_default();
        prune_window(client_deque, now, cfg.per_client_window);
        if client_deque.len() >= cfg.per_client_limit {
            return Err(RateLimitError::PerClientExceeded {
                limit: cfg.per_client_limit,
                window_secs: cfg.per_client_window.as_secs(),
            });
        }

        client_deque.push_back(now);
        inner.global_requests.push_back(now);

        Ok(())
    }

    /// Drop a disconnected client's window.
    pub fn forget(&self, client_id: Uuid) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.client_requests.remove(&client_id);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.saturating_duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
