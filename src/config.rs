//! Service configuration parsed from environment variables.
//!
//! `main` loads an optional `.env` file first (via `dotenvy`), so every
//! variable below can live there during local development. Every value has a
//! default; only malformed values that would make the service misbehave
//! (an inverted interval range, a zero capacity) are rejected.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SEED_COUNT: usize = 500;
pub const DEFAULT_FEED_CAPACITY: usize = 500;
pub const DEFAULT_FEED_MIN_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_FEED_MAX_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_FEED_STARTUP_DELAY_SECS: u64 = 5;
pub const DEFAULT_AGENT_TICK_SECS: u64 = 3;
pub const DEFAULT_AGENT_STATUS_TICK_SECS: u64 = 5;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_CHAT_DELAY_MIN_MS: u64 = 1000;
pub const DEFAULT_CHAT_DELAY_MAX_MS: u64 = 2000;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Timer settings for the simulated live feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedTiming {
    pub min_interval: Duration,
    pub max_interval: Duration,
    pub startup_delay: Duration,
}

/// Optional external backend used before falling back to mock data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpstreamConfig {
    pub api_url: Option<String>,
    pub ws_url: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub seed_count: usize,
    pub feed_capacity: usize,
    pub feed: FeedTiming,
    pub agent_tick: Duration,
    pub agent_status_tick: Duration,
    pub search_debounce: Duration,
    pub chat_delay_min: Duration,
    pub chat_delay_max: Duration,
    pub upstream: UpstreamConfig,
    pub map_token: Option<String>,
    pub static_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            seed_count: DEFAULT_SEED_COUNT,
            feed_capacity: DEFAULT_FEED_CAPACITY,
            feed: FeedTiming {
                min_interval: Duration::from_secs(DEFAULT_FEED_MIN_INTERVAL_SECS),
                max_interval: Duration::from_secs(DEFAULT_FEED_MAX_INTERVAL_SECS),
                startup_delay: Duration::from_secs(DEFAULT_FEED_STARTUP_DELAY_SECS),
            },
            agent_tick: Duration::from_secs(DEFAULT_AGENT_TICK_SECS),
            agent_status_tick: Duration::from_secs(DEFAULT_AGENT_STATUS_TICK_SECS),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            chat_delay_min: Duration::from_millis(DEFAULT_CHAT_DELAY_MIN_MS),
            chat_delay_max: Duration::from_millis(DEFAULT_CHAT_DELAY_MAX_MS),
            upstream: UpstreamConfig {
                api_url: None,
                ws_url: None,
                timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            },
            map_token: None,
            static_dir: None,
        }
    }
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT` (default 8000)
    /// - `SEED_COUNT`: mock records generated at startup (default 500)
    /// - `FEED_CAPACITY`: max records kept in memory (default 500)
    /// - `FEED_MIN_INTERVAL_SECS` / `FEED_MAX_INTERVAL_SECS`: live tick range (10..30)
    /// - `FEED_STARTUP_DELAY_SECS`: delay before the first live tick (5)
    /// - `AGENT_TICK_SECS` / `AGENT_STATUS_TICK_SECS`: agent timers (3 / 5)
    /// - `SEARCH_DEBOUNCE_MS`: websocket search debounce (300)
    /// - `CHAT_DELAY_MIN_MS` / `CHAT_DELAY_MAX_MS`: simulated typing delay (1000..2000)
    /// - `UPSTREAM_API_URL`, `UPSTREAM_WS_URL`, `UPSTREAM_TIMEOUT_SECS`
    /// - `MAP_TOKEN`, `STATIC_DIR`
    ///
    /// # Errors
    ///
    /// Returns an error for a zero capacity or an inverted interval range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let feed_capacity = env_parse("FEED_CAPACITY", DEFAULT_FEED_CAPACITY);
        if feed_capacity == 0 {
            return Err(ConfigError::Invalid { key: "FEED_CAPACITY", reason: "must be at least 1".into() });
        }

        let min_secs = env_parse("FEED_MIN_INTERVAL_SECS", DEFAULT_FEED_MIN_INTERVAL_SECS);
        let max_secs = env_parse("FEED_MAX_INTERVAL_SECS", DEFAULT_FEED_MAX_INTERVAL_SECS);
        if min_secs > max_secs {
            return Err(ConfigError::Invalid {
                key: "FEED_MIN_INTERVAL_SECS",
                reason: format!("{min_secs} exceeds FEED_MAX_INTERVAL_SECS {max_secs}"),
            });
        }

        let chat_min = env_parse("CHAT_DELAY_MIN_MS", DEFAULT_CHAT_DELAY_MIN_MS);
        let chat_max = env_parse("CHAT_DELAY_MAX_MS", DEFAULT_CHAT_DELAY_MAX_MS);
        if chat_min > chat_max {
            return Err(ConfigError::Invalid {
                key: "CHAT_DELAY_MIN_MS",
                reason: format!("{chat_min} exceeds CHAT_DELAY_MAX_MS {chat_max}"),
            });
        }

        Ok(Self {
            port: env_parse("PORT", DEFAULT_PORT),
            seed_count: env_parse("SEED_COUNT", DEFAULT_SEED_COUNT),
            feed_capacity,
            feed: FeedTiming {
                min_interval: Duration::from_secs(min_secs),
                max_interval: Duration::from_secs(max_secs),
                startup_delay: Duration::from_secs(env_parse(
                    "FEED_STARTUP_DELAY_SECS",
                    DEFAULT_FEED_STARTUP_DELAY_SECS,
                )),
            },
            agent_tick: Duration::from_secs(env_parse("AGENT_TICK_SECS", DEFAULT_AGENT_TICK_SECS).max(1)),
            agent_status_tick: Duration::from_secs(
                env_parse("AGENT_STATUS_TICK_SECS", DEFAULT_AGENT_STATUS_TICK_SECS).max(1),
            ),
            search_debounce: Duration::from_millis(env_parse("SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS)),
            chat_delay_min: Duration::from_millis(chat_min),
            chat_delay_max: Duration::from_millis(chat_max),
            upstream: UpstreamConfig {
                api_url: env_url("UPSTREAM_API_URL"),
                ws_url: env_url("UPSTREAM_WS_URL"),
                timeout: Duration::from_secs(env_parse("UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT_SECS)),
            },
            map_token: env_non_empty("MAP_TOKEN"),
            static_dir: env_non_empty("STATIC_DIR"),
        })
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_url(key: &str) -> Option<String> {
    env_non_empty(key).map(|v| v.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
