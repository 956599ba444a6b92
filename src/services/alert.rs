//! Alert desk: turns each live disruption into a stakeholder alert.
//!
//! DESIGN
//! ======
//! Every published disruption gets an optimization plan (alternative routes
//! through the catalog plus fixed savings estimates) and an alert whose
//! severity is recomputed from confidence and affected-route count rather
//! than copied from the record. Notifications are simulated by a log line
//! per stakeholder. History is kept newest-first and capped.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{Disruption, Severity};
use crate::services::catalog;
use crate::state::AppState;

pub const ALERT_HISTORY_CAP: usize = 100;

/// Routes assumed affected when the disruption's port has no catalog route.
const FALLBACK_ROUTES: [&str; 2] = ["route-1", "route-2"];

const ADDITIONAL_COST: u64 = 15_000;
const ADDITIONAL_TIME_HOURS: u32 = 8;
const RISK_REDUCTION: f64 = 0.45;
const ESTIMATED_COST_SAVINGS: u64 = 450_000;
const ESTIMATED_TIME_SAVINGS_HOURS: u32 = 24;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert not found: {0}")]
    NotFound(String),
}

impl crate::frame::ErrorCode for AlertError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_ALERT_NOT_FOUND",
        }
    }
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Pending,
    Active,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeRoute {
    pub original_route: String,
    pub alternative_route: String,
    pub additional_cost: u64,
    pub additional_time_hours: u32,
    pub risk_reduction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: String,
    pub disruption_id: String,
    pub location_name: String,
    pub severity: Severity,
    pub stakeholders: Vec<&'static str>,
    pub recommended_actions: Vec<AlternativeRoute>,
    pub estimated_cost_savings: u64,
    pub estimated_time_savings_hours: u32,
    pub optimization_score: f64,
    pub status: AlertStatus,
    pub notifications_sent: usize,
    pub timestamp: DateTime<Utc>,
}

/// Progress summary returned by `track_resolution`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub alert_id: String,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub actions_taken: usize,
    /// Always `None`; alerts are never marked resolved.
    pub resolution_time: Option<u64>,
}

// =============================================================================
// SCORING
// =============================================================================

/// Alert severity from prediction confidence and affected-route count.
#[must_use]
pub fn calculate_severity(confidence: f64, affected_routes: u32) -> Severity {
    if confidence > 0.9 && affected_routes > 10 {
        Severity::Critical
    } else if confidence > 0.8 && affected_routes > 5 {
        Severity::High
    } else if confidence > 0.7 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Who gets notified. Leadership is added for high-confidence predictions.
#[must_use]
pub fn identify_stakeholders(confidence: f64) -> Vec<&'static str> {
    let mut stakeholders = vec!["logistics_manager"];
    if confidence > 0.85 {
        stakeholders.extend(["operations_director", "c_level"]);
    }
    stakeholders
}

/// One detour per catalog route touching the disruption's port.
#[must_use]
pub fn alternative_routes(location_name: &str) -> Vec<AlternativeRoute> {
    let touching: Vec<&str> = catalog::routes_touching(location_name).iter().map(|r| r.id).collect();
    let ids = if touching.is_empty() { FALLBACK_ROUTES.to_vec() } else { touching };

    ids.into_iter()
        .map(|id| AlternativeRoute {
            original_route: id.to_string(),
            alternative_route: format!("{id}-alt"),
            additional_cost: ADDITIONAL_COST,
            additional_time_hours: ADDITIONAL_TIME_HOURS,
            risk_reduction: RISK_REDUCTION,
        })
        .collect()
}

/// Weighted blend of fixed cost, time, and risk sub-scores.
#[must_use]
pub fn optimization_score() -> f64 {
    let (cost, time, risk) = (0.3, 0.5, 0.2);
    cost * 0.8 + time * 0.9 + risk * 0.95
}

// =============================================================================
// DESK
// =============================================================================

#[derive(Debug)]
pub struct AlertDesk {
    history: VecDeque<Alert>,
    capacity: usize,
    next_seq: u64,
}

impl Default for AlertDesk {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertDesk {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(ALERT_HISTORY_CAP)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { history: VecDeque::new(), capacity: capacity.max(1), next_seq: 1 }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Build a pending alert for `disruption` and record it.
    pub fn create(&mut self, disruption: &Disruption, now: DateTime<Utc>) -> Alert {
        let alert = Alert {
            id: format!("alert-{}", self.next_seq),
            disruption_id: disruption.id.clone(),
            location_name: disruption.location_name.clone(),
            severity: calculate_severity(disruption.confidence, disruption.affected_routes),
            stakeholders: identify_stakeholders(disruption.confidence),
            recommended_actions: alternative_routes(&disruption.location_name),
            estimated_cost_savings: ESTIMATED_COST_SAVINGS,
            estimated_time_savings_hours: ESTIMATED_TIME_SAVINGS_HOURS,
            optimization_score: optimization_score(),
            status: AlertStatus::Pending,
            notifications_sent: 0,
            timestamp: now,
        };
        self.next_seq += 1;
        self.history.push_front(alert.clone());
        self.history.truncate(self.capacity);
        alert
    }

    /// Mark an alert active after its notifications went out.
    pub fn activate(&mut self, id: &str, notifications_sent: usize) -> Option<&Alert> {
        let alert = self.history.iter_mut().find(|a| a.id == id)?;
        alert.status = AlertStatus::Active;
        alert.notifications_sent = notifications_sent;
        Some(alert)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.history.iter().find(|a| a.id == id)
    }

    /// Newest first.
    #[must_use]
    pub fn history(&self) -> Vec<Alert> {
        self.history.iter().cloned().collect()
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.history.iter().filter(|a| a.status == AlertStatus::Active).count()
    }

    /// # Errors
    ///
    /// Returns `AlertError::NotFound` for unknown or evicted ids.
    pub fn track_resolution(&self, id: &str) -> Result<Resolution, AlertError> {
        let alert = self.get(id).ok_or_else(|| AlertError::NotFound(id.to_string()))?;
        Ok(Resolution {
            alert_id: alert.id.clone(),
            status: alert.status,
            created_at: alert.timestamp,
            actions_taken: alert.recommended_actions.len(),
            resolution_time: None,
        })
    }
}

// =============================================================================
// WORKFLOW
// =============================================================================

/// Create an alert for a freshly published disruption, notify its
/// stakeholders, and mark it active.
pub async fn process(state: &AppState, disruption: &Disruption) -> Alert {
    let mut desk = state.alerts.write().await;
    let alert = desk.create(disruption, Utc::now());

    for stakeholder in &alert.stakeholders {
        debug!(alert_id = %alert.id, stakeholder, channel = "email", "alert: notification sent");
    }
    let sent = alert.stakeholders.len();
    let alert = desk.activate(&alert.id, sent).cloned().unwrap_or(alert);

    info!(
        alert_id = %alert.id,
        disruption_id = %alert.disruption_id,
        severity = alert.severity.as_str(),
        notifications = sent,
        "alert: raised"
    );
    alert
}

#[cfg(test)]
#[path = "alert_test.rs"]
mod tests;
