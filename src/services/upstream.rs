//! Upstream sync: optional real backend feeding the local disruption list.
//!
//! DESIGN
//! ======
//! Two independent channels, both opt-in via config:
//! - REST: one `GET {UPSTREAM_API_URL}/api/disruptions` at startup. A
//!   non-empty result is merged on top of the mock data, keeping at most
//!   `UPSTREAM_KEEP_PREVIOUS` older records. Any failure keeps the mock data.
//! - Websocket: one subscription to `UPSTREAM_WS_URL`. Each text message that
//!   decodes as a disruption is published exactly like a locally generated
//!   one. When the connection fails or closes the status flips to Offline and
//!   the task ends; there is no reconnect.
//!
//! Upstream records use a looser wire shape than ours (naive timestamps, no
//! region or status), so they go through `WireDisruption` first.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use futures::StreamExt;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

use crate::model::{Disruption, DisruptionStatus, Region, Severity};
use crate::services::feed::{self, FeedStore, UPSTREAM_KEEP_PREVIOUS};
use crate::services::mock;
use crate::state::{AppState, UpstreamStatus};

const CONNECT_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("upstream request failed: {0}")]
    Request(String),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("upstream response parse failed: {0}")]
    Parse(String),
    #[error("invalid upstream record: {0}")]
    InvalidRecord(String),
    #[error("upstream websocket connect failed: {0}")]
    Connect(String),
    #[error("upstream timed out")]
    Timeout,
}

impl crate::frame::ErrorCode for UpstreamError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::HttpClientBuild(_) => "E_UPSTREAM_CLIENT",
            Self::Request(_) | Self::Connect(_) => "E_UPSTREAM_UNAVAILABLE",
            Self::Status(_) => "E_UPSTREAM_STATUS",
            Self::Parse(_) | Self::InvalidRecord(_) => "E_UPSTREAM_PARSE",
            Self::Timeout => "E_UPSTREAM_TIMEOUT",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Request(_) | Self::Connect(_) | Self::Timeout => true,
            Self::Status(status) => *status >= 500,
            _ => false,
        }
    }
}

// =============================================================================
// WIRE SHAPE
// =============================================================================

/// Upstream record. Only type, location, severity, confidence, and affected
/// routes are required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDisruption {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: [f64; 2],
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub severity: String,
    #[serde(default)]
    pub status: Option<String>,
    pub confidence: f64,
    pub affected_routes: u32,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl WireDisruption {
    /// Fill gaps from the nearest known port and `now`. The id is left empty
    /// when upstream sent none; `assign_ids` fills it.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::InvalidRecord` for an unknown severity.
    pub fn into_disruption(self, now: DateTime<Utc>) -> Result<Disruption, UpstreamError> {
        let severity = Severity::parse(&self.severity)
            .ok_or_else(|| UpstreamError::InvalidRecord(format!("unknown severity {:?}", self.severity)))?;
        let port = mock::nearest_port(self.location);
        let location_name = self
            .location_name
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| port.name.to_string());
        let region = self.region.as_deref().and_then(Region::parse).unwrap_or(port.region);
        let status = self
            .status
            .as_deref()
            .and_then(DisruptionStatus::parse)
            .unwrap_or(DisruptionStatus::Active);
        let timestamp = self.timestamp.as_deref().and_then(parse_timestamp).unwrap_or(now);
        let description = self
            .description
            .unwrap_or_else(|| format!("AI agents detected potential disruption in {location_name}"));

        Ok(Disruption {
            id: self.id.unwrap_or_default(),
            kind: self.kind,
            location: self.location,
            location_name,
            region,
            severity,
            status,
            confidence: self.confidence,
            affected_routes: self.affected_routes,
            timestamp,
            description,
        })
    }
}

/// RFC 3339, or a naive ISO timestamp taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Decode one websocket text message. Accepts a bare record, or an envelope
/// carrying it under `data.disruption` or `data`.
///
/// # Errors
///
/// Returns `UpstreamError::Parse` when no record can be found.
pub fn parse_ws_message(text: &str, now: DateTime<Utc>) -> Result<Disruption, UpstreamError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| UpstreamError::Parse(e.to_string()))?;
    let candidates = [
        value.pointer("/data/disruption"),
        value.get("data"),
        Some(&value),
    ];
    for candidate in candidates.into_iter().flatten() {
        if let Ok(wire) = WireDisruption::deserialize(candidate) {
            return wire.into_disruption(now);
        }
    }
    Err(UpstreamError::Parse("message carries no disruption".into()))
}

/// Give every record without an id, or with an id already in the feed or
/// earlier in the batch, a fresh `disruption-{n}` id that collides with
/// nothing kept.
pub fn assign_ids(feed: &mut FeedStore, records: &mut [Disruption]) {
    let mut kept: HashSet<String> = HashSet::with_capacity(records.len());
    let mut replace = Vec::new();
    for (i, record) in records.iter().enumerate() {
        if record.id.is_empty() || feed.get(&record.id).is_some() || !kept.insert(record.id.clone()) {
            replace.push(i);
        }
    }
    for i in replace {
        records[i].id = loop {
            let candidate = format!("disruption-{}", feed.next_seq());
            if feed.get(&candidate).is_none() && !kept.contains(&candidate) {
                break candidate;
            }
        };
    }
}

// =============================================================================
// SOURCE
// =============================================================================

#[async_trait::async_trait]
pub trait DisruptionSource: Send + Sync {
    /// Fetch the upstream's current disruption list.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] if the request fails, the status is not
    /// 2xx, or the body is not a JSON array.
    async fn fetch(&self) -> Result<Vec<Disruption>, UpstreamError>;
}

pub struct HttpSource {
    http: reqwest::Client,
    url: String,
}

impl HttpSource {
    /// # Errors
    ///
    /// Returns `UpstreamError::HttpClientBuild` if reqwest cannot build a
    /// client.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .build()
            .map_err(|e| UpstreamError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url: format!("{}/api/disruptions", base_url.trim_end_matches('/')) })
    }
}

#[async_trait::async_trait]
impl DisruptionSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<Disruption>, UpstreamError> {
        let response = self.http.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() { UpstreamError::Timeout } else { UpstreamError::Request(e.to_string()) }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        let text = response
            .text()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        parse_batch(&text, Utc::now())
    }
}

/// Decode a JSON array of wire records, skipping (and logging) bad entries.
///
/// # Errors
///
/// Returns `UpstreamError::Parse` if the body is not a JSON array.
pub fn parse_batch(text: &str, now: DateTime<Utc>) -> Result<Vec<Disruption>, UpstreamError> {
    let items: Vec<serde_json::Value> = serde_json::from_str(text).map_err(|e| UpstreamError::Parse(e.to_string()))?;
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match WireDisruption::deserialize(&item)
            .map_err(|e| UpstreamError::InvalidRecord(e.to_string()))
            .and_then(|wire| wire.into_disruption(now))
        {
            Ok(record) => records.push(record),
            Err(e) => warn!(error = %e, "upstream: skipping record"),
        }
    }
    Ok(records)
}

// =============================================================================
// SYNC TASKS
// =============================================================================

/// Pull once from `source` and merge a non-empty result into the feed.
/// Returns how many records were merged.
///
/// # Errors
///
/// Propagates the source's error; the feed is untouched in that case.
pub async fn sync_once(state: &AppState, source: &dyn DisruptionSource) -> Result<usize, UpstreamError> {
    let mut batch = source.fetch().await?;
    if batch.is_empty() {
        return Ok(0);
    }
    let mut feed = state.feed.write().await;
    assign_ids(&mut feed, &mut batch);
    let merged = batch.len();
    feed.merge_front(batch, UPSTREAM_KEEP_PREVIOUS);
    Ok(merged)
}

/// Spawn the upstream task when any upstream is configured.
pub fn spawn_upstream_sync(state: AppState) -> Option<JoinHandle<()>> {
    let upstream = state.config.upstream.clone();
    if upstream.api_url.is_none() && upstream.ws_url.is_none() {
        return None;
    }

    Some(tokio::spawn(async move {
        if let Some(api_url) = upstream.api_url.as_deref() {
            let result = match HttpSource::new(api_url, upstream.timeout) {
                Ok(source) => sync_once(&state, &source).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(merged) => {
                    info!(%api_url, merged, "upstream: initial sync complete");
                    if upstream.ws_url.is_none() {
                        state.set_upstream_status(UpstreamStatus::Online).await;
                    }
                }
                Err(e) => {
                    warn!(%api_url, error = %e, "upstream: initial sync failed; keeping mock data");
                    if upstream.ws_url.is_none() {
                        state.set_upstream_status(UpstreamStatus::Offline).await;
                    }
                }
            }
        }

        if let Some(ws_url) = upstream.ws_url.as_deref() {
            if let Err(e) = relay(&state, ws_url, upstream.timeout).await {
                warn!(%ws_url, error = %e, "upstream: websocket relay stopped");
            }
            state.set_upstream_status(UpstreamStatus::Offline).await;
        }
    }))
}

/// Subscribe to the upstream websocket and publish each decoded record
/// until the connection ends.
///
/// # Errors
///
/// Returns `UpstreamError::Connect` or `UpstreamError::Timeout` when the
/// handshake fails. A clean close after connecting is `Ok`.
pub async fn relay(state: &AppState, ws_url: &str, connect_timeout: Duration) -> Result<(), UpstreamError> {
    let (mut stream, _) = tokio::time::timeout(connect_timeout, tokio_tungstenite::connect_async(ws_url))
        .await
        .map_err(|_| UpstreamError::Timeout)?
        .map_err(|e| UpstreamError::Connect(e.to_string()))?;

    state.set_upstream_status(UpstreamStatus::Online).await;
    info!(%ws_url, "upstream: websocket connected");

    while let Some(message) = stream.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => return Err(UpstreamError::Connect(e.to_string())),
        };

        let mut record = match parse_ws_message(text.as_str(), Utc::now()) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "upstream: ignoring websocket message");
                continue;
            }
        };
        {
            let mut feed = state.feed.write().await;
            assign_ids(&mut feed, std::slice::from_mut(&mut record));
        }
        info!(id = %record.id, location = %record.location_name, "upstream: disruption received");
        feed::publish(state, record).await;
    }

    info!(%ws_url, "upstream: websocket closed");
    Ok(())
}

#[cfg(test)]
#[path = "upstream_test.rs"]
mod tests;
