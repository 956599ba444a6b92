//! Read-only dashboard routes: health, route catalog, metrics, analytics,
//! map markers, agent board, and alerts.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::services::agents::{AGENT_PROFILES, AgentActivity, AgentState, AgentStatus};
use crate::services::alert::{Alert, AlertError, Resolution};
use crate::services::analytics::{self, Insight, MapPoint, Summary};
use crate::services::catalog::{self, METRICS, Metrics, PREDICTION_ACCURACY, ROUTE_PERFORMANCE, Route, RoutePerformance, RouteStatus};
use crate::state::{AppState, UpstreamStatus};

pub const SERVICE_NAME: &str = "Global Supply Chain Intelligence Network";

pub(crate) fn alert_error_to_status(err: &AlertError) -> StatusCode {
    match err {
        AlertError::NotFound(_) => StatusCode::NOT_FOUND,
    }
}

// =============================================================================
// HEALTH
// =============================================================================

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub mode: &'static str,
    pub upstream: UpstreamStatus,
    pub agents: BTreeMap<&'static str, AgentState>,
}

/// `GET /`
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let agents = state
        .agents
        .read()
        .await
        .statuses()
        .into_iter()
        .map(|a| (a.name, a.status))
        .collect();
    Json(Health {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        mode: METRICS.mode,
        upstream: *state.upstream.read().await,
        agents,
    })
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct RoutesQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// `GET /api/routes?status=disrupted`: `all` or no status returns everything.
pub async fn list_routes(Query(query): Query<RoutesQuery>) -> Result<Json<Vec<Route>>, StatusCode> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("" | "all") => None,
        Some(raw) => Some(RouteStatus::parse(raw).ok_or(StatusCode::BAD_REQUEST)?),
    };
    Ok(Json(catalog::filter_by_status(status)))
}

/// `GET /api/metrics`
pub async fn metrics() -> Json<Metrics> {
    Json(METRICS)
}

// =============================================================================
// ANALYTICS
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub summary: Summary,
    pub route_performance: &'static [RoutePerformance],
    pub prediction_accuracy: &'static [f64],
}

/// `GET /api/analytics`
pub async fn analytics(State(state): State<AppState>) -> Json<AnalyticsResponse> {
    let records = state.feed.read().await.snapshot();
    Json(AnalyticsResponse {
        summary: analytics::summarize(&records),
        route_performance: ROUTE_PERFORMANCE,
        prediction_accuracy: PREDICTION_ACCURACY,
    })
}

/// `GET /api/insights`: resampled on every call.
pub async fn insights(State(state): State<AppState>) -> Json<Vec<Insight>> {
    let records = state.feed.read().await.snapshot();
    Json(analytics::insights(&records, &mut rand::rng()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    pub points: Vec<MapPoint>,
    pub map_token: Option<String>,
    pub upstream: UpstreamStatus,
}

/// `GET /api/map`
pub async fn map(State(state): State<AppState>) -> Json<MapResponse> {
    let points = analytics::map_points(&state.feed.read().await.snapshot());
    Json(MapResponse {
        points,
        map_token: state.config.map_token.clone(),
        upstream: *state.upstream.read().await,
    })
}

// =============================================================================
// AGENTS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct AgentProfile {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AgentsResponse {
    pub agents: Vec<AgentStatus>,
    pub profiles: Vec<AgentProfile>,
}

/// `GET /api/agents`
pub async fn agents(State(state): State<AppState>) -> Json<AgentsResponse> {
    let agents = state.agents.read().await.statuses();
    let profiles = AGENT_PROFILES
        .iter()
        .map(|&(name, description)| AgentProfile { name, description })
        .collect();
    Json(AgentsResponse { agents, profiles })
}

/// `GET /api/agents/activity`: newest first.
pub async fn agent_activity(State(state): State<AppState>) -> Json<Vec<AgentActivity>> {
    Json(state.agents.read().await.activity())
}

// =============================================================================
// ALERTS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub active: usize,
    pub alerts: Vec<Alert>,
}

/// `GET /api/alerts`: newest first.
pub async fn alerts(State(state): State<AppState>) -> Json<AlertsResponse> {
    let desk = state.alerts.read().await;
    Json(AlertsResponse { active: desk.active_count(), alerts: desk.history() })
}

/// `GET /api/alerts/{id}`
pub async fn alert_resolution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Resolution>, StatusCode> {
    state
        .alerts
        .read()
        .await
        .track_resolution(&id)
        .map(Json)
        .map_err(|e| alert_error_to_status(&e))
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
