//! Simulated agent board: rotating activity log plus core agent counters.
//!
//! DESIGN
//! ======
//! Two independent ticks drive the board. The activity tick picks a random
//! agent and action, prepends it to a short log, and broadcasts
//! `agent:activity`. The status tick bumps each core agent's completed-task
//! counter by a small random amount. Neither reflects real work.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::frame::{Data, Frame};
use crate::services::hub;
use crate::state::AppState;

pub const ACTIVITY_LOG_CAP: usize = 20;

/// Largest per-tick bump to a core agent's task counter.
const MAX_TASK_BUMP: u64 = 2;

pub const AGENT_NAMES: [&str; 12] = [
    "Prediction Agent",
    "Optimization Agent",
    "Alert Agent",
    "Weather Analysis Agent",
    "Port Congestion Monitor",
    "Route Planning Agent",
    "Inventory Manager Agent",
    "Customs & Compliance Agent",
    "Risk Assessment Agent",
    "Cost Optimizer Agent",
    "Vessel Tracking Agent",
    "Supply Chain Coordinator",
];

/// `(action, details)` pairs.
pub const ACTIONS: [(&str, &str); 15] = [
    ("Analyzing satellite imagery", "Processing 15 satellite images from Port of Shanghai"),
    ("Processing IoT sensor data", "Analyzing temperature and delay metrics from 50 sensors"),
    ("Running Gemini AI analysis", "Multimodal analysis of weather patterns and news data"),
    ("Calculating alternative routes", "Computing optimal paths using Dijkstra algorithm"),
    ("Optimizing inventory allocation", "Redistributing cargo across 3 regional warehouses"),
    ("Generating stakeholder alerts", "Preparing notifications for 12 affected parties"),
    ("Updating risk scores", "Recalculating risk metrics for 25 active routes"),
    ("GPU processing complete", "Processed batch of 10 images in 2.3 seconds (40x speedup)"),
    ("Monitoring tropical storm", "Tracking hurricane Delta, ETA 36 hours to Caribbean routes"),
    ("Port wait time analysis", "Shanghai: 48hrs, LA/LB: 72hrs, Singapore: 24hrs"),
    ("Customs documentation check", "Verifying HS codes for 234 shipments through EU borders"),
    ("Vessel position update", "Tracking 847 vessels across Pacific and Atlantic corridors"),
    ("Cost reduction identified", "Alternative route saves $12,400 on fuel costs"),
    ("Inventory rebalancing", "Moving 500 units from LA warehouse to Dallas hub"),
    ("Coordination update sent", "Syncing 5 agents on Shanghai congestion response"),
];

/// Short description of every agent in the rotation.
pub const AGENT_PROFILES: [(&str, &str); 12] = [
    ("Prediction Agent", "Analyzes satellite imagery + IoT data + Gemini AI"),
    ("Optimization Agent", "Calculates alternative routes and inventory optimization"),
    ("Alert Agent", "Coordinates notifications to stakeholders"),
    ("Weather Analysis Agent", "Tracks storms, fog, and climate impact on routes"),
    ("Port Congestion Monitor", "Real-time monitoring of 200+ global ports"),
    ("Route Planning Agent", "Dynamic route planning with traffic optimization"),
    ("Inventory Manager Agent", "Manages stock across warehouses globally"),
    ("Customs & Compliance Agent", "Ensures regulatory compliance across borders"),
    ("Risk Assessment Agent", "Evaluates geopolitical and economic risks"),
    ("Cost Optimizer Agent", "Minimizes costs across fuel, labor, and storage"),
    ("Vessel Tracking Agent", "Real-time GPS tracking of 800+ vessels"),
    ("Supply Chain Coordinator", "Orchestrates all agents and manages workflows"),
];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Processing,
    Analyzing,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentActivity {
    pub agent: &'static str,
    pub action: &'static str,
    pub details: &'static str,
    pub status: ActivityStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Active,
    Idle,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub name: &'static str,
    pub status: AgentState,
    pub last_activity: &'static str,
    pub tasks_completed: u64,
}

// =============================================================================
// SAMPLING
// =============================================================================

/// Random agent, random action. Status is processing 30% of the time, and
/// otherwise a coin flip between analyzing and completed.
pub fn sample_activity<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> AgentActivity {
    let agent = AGENT_NAMES.choose(rng).copied().unwrap_or(AGENT_NAMES[0]);
    let (action, details) = ACTIONS.choose(rng).copied().unwrap_or(ACTIONS[0]);
    let status = if rng.random::<f64>() > 0.7 {
        ActivityStatus::Processing
    } else if rng.random::<f64>() > 0.5 {
        ActivityStatus::Analyzing
    } else {
        ActivityStatus::Completed
    };
    AgentActivity { agent, action, details, status, timestamp: now }
}

// =============================================================================
// BOARD
// =============================================================================

#[derive(Debug)]
pub struct AgentBoard {
    core: Vec<AgentStatus>,
    activity: VecDeque<AgentActivity>,
}

impl Default for AgentBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBoard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: vec![
                AgentStatus {
                    name: "Prediction Agent",
                    status: AgentState::Active,
                    last_activity: "Analyzing satellite imagery",
                    tasks_completed: 1247,
                },
                AgentStatus {
                    name: "Optimization Agent",
                    status: AgentState::Active,
                    last_activity: "Recalculating routes",
                    tasks_completed: 892,
                },
                AgentStatus {
                    name: "Alert Agent",
                    status: AgentState::Idle,
                    last_activity: "Monitoring events",
                    tasks_completed: 2341,
                },
            ],
            activity: VecDeque::with_capacity(ACTIVITY_LOG_CAP),
        }
    }

    #[must_use]
    pub fn statuses(&self) -> Vec<AgentStatus> {
        self.core.clone()
    }

    /// Newest first.
    #[must_use]
    pub fn activity(&self) -> Vec<AgentActivity> {
        self.activity.iter().cloned().collect()
    }

    pub fn record(&mut self, activity: AgentActivity) {
        self.activity.push_front(activity);
        self.activity.truncate(ACTIVITY_LOG_CAP);
    }

    /// Bump every core agent's counter by `0..=2`.
    pub fn tick_counters<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for agent in &mut self.core {
            agent.tasks_completed += rng.random_range(0..=MAX_TASK_BUMP);
        }
    }
}

// =============================================================================
// TASKS
// =============================================================================

/// Spawn the activity rotation and the status counter ticks.
pub fn spawn_agent_task(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut activity_tick = tokio::time::interval(state.config.agent_tick);
        let mut status_tick = tokio::time::interval(state.config.agent_status_tick);
        // Both intervals fire immediately; skip that so the board starts at its
        // initial figures.
        activity_tick.tick().await;
        status_tick.tick().await;

        loop {
            tokio::select! {
                _ = activity_tick.tick() => {
                    rotate_activity(&state).await;
                }
                _ = status_tick.tick() => {
                    state.agents.write().await.tick_counters(&mut rand::rng());
                }
            }
        }
    })
}

/// Record one sampled activity and broadcast it.
pub async fn rotate_activity(state: &AppState) -> AgentActivity {
    let activity = sample_activity(&mut rand::rng(), Utc::now());
    state.agents.write().await.record(activity.clone());
    let delivered = hub::broadcast(state, &activity_frame(&activity), None).await;
    debug!(agent = activity.agent, action = activity.action, delivered, "agents: activity");
    activity
}

/// `agent:activity` push frame.
#[must_use]
pub fn activity_frame(activity: &AgentActivity) -> Frame {
    let mut data = Data::new();
    data.insert("activity".into(), serde_json::to_value(activity).unwrap_or_default());
    Frame::request("agent:activity", data).with_from("agents")
}

#[cfg(test)]
#[path = "agents_test.rs"]
mod tests;
