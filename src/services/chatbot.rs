//! Chatbot: keyword-rule assistant over the current disruption feed.
//!
//! DESIGN
//! ======
//! `respond` lower-cases the message and walks an ordered rule list; the
//! first rule with any matching keyword wins. Keywords match as plain
//! substrings, so "this" triggers the greeting rule through "hi". Templates
//! interpolate live counts from the feed snapshot.
//!
//! Sessions keep a bounded message history seeded with a greeting. The
//! websocket path keys sessions by client id; REST callers pass a session id
//! or get a fresh one.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::{Disruption, Severity};
use crate::rate_limit::RateLimitError;
use crate::state::AppState;

/// Messages kept per session, greeting included.
pub const SESSION_HISTORY_CAP: usize = 100;
/// Sessions kept before the least recently used one is evicted.
pub const MAX_SESSIONS: usize = 1024;

pub const GREETING: &str = "Hello! I'm your AI Supply Chain Assistant powered by Google Gemini. I can help you with:\n\n• Real-time disruption analysis\n• Route optimization recommendations\n• Supply chain risk assessment\n• Historical trend insights\n\nHow can I assist you today?";

pub const QUICK_PROMPTS: [&str; 4] = [
    "Show critical disruptions",
    "Optimize my routes",
    "Cost savings analysis",
    "Port status update",
];

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),
}

impl crate::frame::ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "E_EMPTY_MESSAGE",
            Self::RateLimited(e) => crate::frame::ErrorCode::error_code(e),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

// =============================================================================
// RESPONDER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Routes,
    Disruptions,
    Costs,
    Status,
    Weather,
    Ports,
    Technology,
    Data,
    Help,
    Greeting,
}

const RULES: [(Topic, &[&str]); 10] = [
    (Topic::Routes, &["route", "optimize"]),
    (Topic::Disruptions, &["disruption", "alert", "problem"]),
    (Topic::Costs, &["cost", "save", "money"]),
    (Topic::Status, &["status", "how", "doing"]),
    (Topic::Weather, &["weather", "storm", "climate"]),
    (Topic::Ports, &["port", "harbor", "terminal"]),
    (Topic::Technology, &["ai", "gemini", "how does", "technology"]),
    (Topic::Data, &["data", "dataset", "information"]),
    (Topic::Help, &["help", "can you", "what can"]),
    (Topic::Greeting, &["hi", "hello", "hey"]),
];

fn classify(lower: &str) -> Option<Topic> {
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(topic, _)| *topic)
}

/// Reply text for `message` given the current feed.
#[must_use]
pub fn respond(message: &str, disruptions: &[Disruption]) -> String {
    let lower = message.to_lowercase();
    let total = disruptions.len();
    let critical = disruptions.iter().filter(|d| d.severity == Severity::Critical).count();
    let high = disruptions.iter().filter(|d| d.severity == Severity::High).count();

    match classify(&lower) {
        Some(Topic::Routes) => format!(
            "Based on our current analysis of {total} disruptions:\n\n✅ Recommended Alternative Routes:\n• Pacific Express: Consider northern route via Alaska\n• Atlantic Bridge: Route performing optimally (98% reliability)\n• Mediterranean routes: High congestion, suggest 2-3 day delay\n\n💡 Optimization Tip: Routes avoiding {critical} critical zones could save 24-48 hours transit time."
        ),
        Some(Topic::Disruptions) => format!(
            "Current Disruption Overview:\n\n🔴 Critical: {critical} active\n🟠 High: {high} active\n📊 Total: {total} disruptions monitored\n\nTop Issues:\n• Port congestion in Shanghai (+15% volume)\n• Weather delays in North Atlantic\n• Labor negotiations at LA/Long Beach\n\nAI Confidence: 97.3%"
        ),
        Some(Topic::Costs) => "💰 Cost Impact Analysis:\n\n📈 Potential Savings:\n• Early warning system: $2.4M/month\n• Route optimization: $1.8M/month\n• Inventory optimization: $3.2M/month\n\n🎯 ROI: 340% in first year\n⏱️ Average disruption cost avoided: $87,000\n\nWould you like a detailed breakdown for your specific routes?".to_string(),
        Some(Topic::Status) => "📊 System Status Report:\n\n✅ All AI Agents: Online\n✅ Satellite Feeds: Active (15 satellites)\n✅ IoT Sensors: 50,000+ reporting\n✅ Prediction Accuracy: 98.7%\n\n🌐 Global Coverage:\n• 200+ ports monitored\n• 500+ active routes\n• 1TB+ data processed daily\n\nEverything operating normally!".to_string(),
        Some(Topic::Weather) => "🌦️ Weather Impact Analysis:\n\n⚠️ Active Weather Events:\n• Tropical Storm \"Delta\": Affecting Caribbean routes\n• Heavy fog: English Channel\n• Monsoon season: SE Asia delays\n\n📅 7-Day Forecast Impact:\n• Low risk: 65% of routes\n• Medium risk: 25% of routes\n• High risk: 10% of routes\n\nRecommendation: Monitor Caribbean and SE Asian routes closely.".to_string(),
        Some(Topic::Ports) => "⚓ Port Status Summary:\n\n🔴 High Congestion:\n• Shanghai (wait time: 48hrs)\n• Los Angeles/Long Beach (72hrs)\n• Singapore (24hrs)\n\n🟢 Optimal Performance:\n• Rotterdam (12hrs)\n• Hamburg (8hrs)\n• Dubai (6hrs)\n\nAverage global port efficiency: 87%\n\nWould you like details on a specific port?".to_string(),
        Some(Topic::Technology) => "🤖 AI Technology Stack:\n\n🧠 Google Gemini 1.5 Pro:\n• Multimodal analysis (images, text, sensors)\n• 1M token context window\n• Real-time processing\n\n⚡ NVIDIA L4 GPU:\n• 40x faster than CPU\n• Parallel processing of satellite imagery\n• Real-time inference\n\n📊 Data Sources:\n• 15 satellites (10m resolution)\n• 50,000+ IoT sensors\n• 100+ news feeds\n• 500+ shipping carriers\n\nAll powered by Google Cloud Run for seamless scaling!".to_string(),
        Some(Topic::Data) => format!(
            "📚 Dataset Information:\n\n📊 Current Dataset Size:\n• {total} active disruptions\n• 1.2 PB historical data\n• 50+ global data sources\n• Real-time updates every 30s\n\n🗺️ Geographic Coverage:\n• 200+ major ports\n• 500+ shipping routes\n• 150+ countries\n\n🕐 Historical Depth:\n• 10 years of disruption data\n• Weather patterns since 2014\n• Port performance metrics\n\nData refresh rate: 30 seconds"
        ),
        Some(Topic::Help) => "🎯 I can help you with:\n\n1️⃣ **Disruption Analysis**\n   • Current alerts and risks\n   • Severity assessment\n   • Impact predictions\n\n2️⃣ **Route Optimization**\n   • Alternative route suggestions\n   • Cost-benefit analysis\n   • Transit time estimates\n\n3️⃣ **Predictive Insights**\n   • 24-72 hour forecasts\n   • Risk probability scores\n   • Historical pattern analysis\n\n4️⃣ **Real-time Monitoring**\n   • Port status updates\n   • Weather impact reports\n   • Vessel tracking\n\nJust ask me anything about your supply chain!".to_string(),
        Some(Topic::Greeting) => format!(
            "Hello! 👋 I'm your AI Supply Chain Assistant.\n\nI'm currently monitoring {total} disruptions across global supply chains. How can I help you today?\n\nPopular queries:\n• \"Show me critical disruptions\"\n• \"What routes should I avoid?\"\n• \"How much can I save?\"\n• \"Port status update\""
        ),
        None => format!(
            "I understand you're asking about \"{message}\". \n\nBased on our current data:\n• {total} disruptions being tracked\n• {critical} critical situations\n• 98.7% prediction accuracy\n\n💡 Try asking me:\n• \"What are the critical disruptions?\"\n• \"Which routes are optimal?\"\n• \"Show me cost savings\"\n• \"Port congestion status\"\n\nHow else can I assist you?"
        ),
    }
}

/// Simulated typing delay, uniform in `[min, max]`.
pub fn typing_delay<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    if min >= max {
        return min;
    }
    let min_ms = u64::try_from(min.as_millis()).unwrap_or(u64::MAX);
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(rng.random_range(min_ms..=max_ms))
}

// =============================================================================
// SESSIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self { id: Uuid::new_v4(), role, content: content.into(), timestamp }
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    last_active: DateTime<Utc>,
}

impl ChatSession {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { messages: vec![ChatMessage::new(Role::Assistant, GREETING, now)], last_active: now }
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append a user message and its reply, dropping the oldest past the cap.
    pub fn push_exchange(&mut self, user: &str, reply: &str, now: DateTime<Utc>) {
        self.messages.push(ChatMessage::new(Role::User, user, now));
        self.messages.push(ChatMessage::new(Role::Assistant, reply, now));
        if self.messages.len() > SESSION_HISTORY_CAP {
            let excess = self.messages.len() - SESSION_HISTORY_CAP;
            self.messages.drain(..excess);
        }
        self.last_active = now;
    }
}

#[derive(Debug)]
pub struct ChatSessions {
    sessions: HashMap<Uuid, ChatSession>,
    max_sessions: usize,
}

impl Default for ChatSessions {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSessions {
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(MAX_SESSIONS)
    }

    #[must_use]
    pub fn with_limit(max_sessions: usize) -> Self {
        Self { sessions: HashMap::new(), max_sessions: max_sessions.max(1) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&ChatSession> {
        self.sessions.get(&id)
    }

    /// Fetch or create a session, evicting the least recently active one
    /// when full. Returns the evicted session id alongside the entry.
    pub fn entry(&mut self, id: Uuid, now: DateTime<Utc>) -> (&mut ChatSession, Option<Uuid>) {
        let mut evicted = None;
        if !self.sessions.contains_key(&id) && self.sessions.len() >= self.max_sessions {
            evicted = self
                .sessions
                .iter()
                .min_by_key(|(_, s)| s.last_active)
                .map(|(id, _)| *id);
            if let Some(stalest) = evicted {
                self.sessions.remove(&stalest);
            }
        }
        let session = self.sessions.entry(id).or_insert_with(|| ChatSession::new(now));
        (session, evicted)
    }

    pub fn remove(&mut self, id: Uuid) {
        self.sessions.remove(&id);
    }
}

// =============================================================================
// WORKFLOW
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub session_id: Uuid,
    pub reply: String,
    pub history_len: usize,
}

/// A message that passed validation and the rate limit, waiting out its
/// typing delay.
#[derive(Debug, Clone)]
pub struct PendingChat {
    pub session_id: Uuid,
    pub delay: Duration,
    message: String,
}

/// Validate and rate-limit a message, and pick its typing delay.
///
/// # Errors
///
/// `ChatError::EmptyMessage` for blank input, `ChatError::RateLimited` when
/// the session or the service is over its message budget.
pub fn prepare(state: &AppState, session_id: Uuid, message: &str) -> Result<PendingChat, ChatError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    state.rate_limiter.check_and_record(session_id)?;

    let delay = typing_delay(&mut rand::rng(), state.config.chat_delay_min, state.config.chat_delay_max);
    Ok(PendingChat { session_id, delay, message: message.to_owned() })
}

/// Answer a prepared message against the feed as it is now and record the
/// exchange. Evicting a session also drops its rate-limit window.
pub async fn answer(state: &AppState, pending: PendingChat) -> ChatReply {
    let PendingChat { session_id, message, .. } = pending;
    let reply = {
        let feed = state.feed.read().await;
        respond(&message, &feed.snapshot())
    };

    let (history_len, evicted) = {
        let mut chats = state.chats.write().await;
        let (session, evicted) = chats.entry(session_id, Utc::now());
        session.push_exchange(&message, &reply, Utc::now());
        (session.messages().len(), evicted)
    };
    if let Some(evicted) = evicted {
        state.rate_limiter.forget(evicted);
        debug!(%evicted, "chat: evicted idle session");
    }

    info!(%session_id, chars = message.len(), "chat: replied");
    ChatReply { session_id, reply, history_len }
}

/// Validate, rate-limit, wait out the typing delay, and answer.
///
/// # Errors
///
/// Same as [`prepare`].
pub async fn send(state: &AppState, session_id: Uuid, message: &str) -> Result<ChatReply, ChatError> {
    let pending = prepare(state, session_id, message)?;
    if !pending.delay.is_zero() {
        tokio::time::sleep(pending.delay).await;
    }
    Ok(answer(state, pending).await)
}

#[cfg(test)]
#[path = "chatbot_test.rs"]
mod tests;
