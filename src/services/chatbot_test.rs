use super::*;

use chrono::TimeZone;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::frame::ErrorCode;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::test_helpers::{self, disruption};

fn sample_feed() -> Vec<Disruption> {
    vec![
        disruption("disruption-1", Severity::Critical, "a"),
        disruption("disruption-2", Severity::Critical, "b"),
        disruption("disruption-3", Severity::High, "c"),
        disruption("disruption-4", Severity::Low, "d"),
    ]
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 12, 12, 0, 0).unwrap()
}

#[test]
fn route_rule_wins_over_later_rules() {
    // "route" and "cost" both match; routes come first.
    let reply = respond("What route has the lowest cost?", &sample_feed());
    assert!(reply.starts_with("Based on our current analysis of 4 disruptions"));
    assert!(reply.contains("Routes avoiding 2 critical zones"));
}

#[test]
fn disruption_rule_interpolates_counts() {
    let reply = respond("Any ALERTS today?", &sample_feed());
    assert!(reply.contains("Critical: 2 active"));
    assert!(reply.contains("High: 1 active"));
    assert!(reply.contains("Total: 4 disruptions monitored"));
}

#[test]
fn status_rule_shadows_how_does() {
    let reply = respond("how does the technology work", &[]);
    assert!(reply.starts_with("📊 System Status Report"));
}

#[test]
fn technology_rule_matches_ai() {
    let reply = respond("tell me about gemini", &[]);
    assert!(reply.starts_with("🤖 AI Technology Stack"));
}

#[test]
fn greeting_matches_as_substring() {
    let reply = respond("this", &sample_feed());
    assert!(reply.contains("currently monitoring 4 disruptions"));
}

#[test]
fn data_rule_reports_total() {
    let reply = respond("dataset size?", &sample_feed());
    assert!(reply.contains("• 4 active disruptions"));
}

#[test]
fn default_echoes_input() {
    let reply = respond("Quarterly Zebra", &sample_feed());
    assert!(reply.starts_with("I understand you're asking about \"Quarterly Zebra\"."));
    assert!(reply.contains("• 2 critical situations"));
}

#[test]
fn quick_prompts_hit_distinct_rules() {
    let feed = sample_feed();
    let replies: Vec<_> = QUICK_PROMPTS.iter().map(|p| respond(p, &feed)).collect();
    assert!(replies[0].starts_with("Current Disruption Overview"));
    assert!(replies[1].starts_with("Based on our current analysis"));
    assert!(replies[2].starts_with("💰 Cost Impact Analysis"));
    assert!(replies[3].starts_with("📊 System Status Report"));
}

#[test]
fn typing_delay_bounds() {
    let mut rng = StdRng::seed_from_u64(5);
    let min = Duration::from_millis(1000);
    let max = Duration::from_millis(2000);
    for _ in 0..100 {
        let d = typing_delay(&mut rng, min, max);
        assert!(d >= min && d <= max);
    }
    assert_eq!(typing_delay(&mut rng, Duration::ZERO, Duration::ZERO), Duration::ZERO);
}

#[test]
fn session_starts_with_greeting_and_caps_history() {
    let mut session = ChatSession::new(now());
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.messages()[0].role, Role::Assistant);
    assert_eq!(session.messages()[0].content, GREETING);

    for n in 0..SESSION_HISTORY_CAP {
        session.push_exchange(&format!("q{n}"), "a", now());
    }
    assert_eq!(session.messages().len(), SESSION_HISTORY_CAP);
    assert_eq!(session.messages().last().map(|m| m.role), Some(Role::Assistant));
}

#[test]
fn sessions_evict_least_recently_active() {
    let mut sessions = ChatSessions::with_limit(2);
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let t0 = now();

    sessions.entry(a, t0);
    sessions.entry(b, t0 + chrono::Duration::seconds(1));
    sessions.entry(a, t0).0.push_exchange("hi", "hello", t0 + chrono::Duration::seconds(2));
    let (_, evicted) = sessions.entry(c, t0 + chrono::Duration::seconds(3));

    assert_eq!(evicted, Some(b));

    assert_eq!(sessions.len(), 2);
    assert!(sessions.get(a).is_some());
    assert!(sessions.get(b).is_none());
    assert!(sessions.get(c).is_some());
}

#[tokio::test]
async fn send_rejects_blank_messages() {
    let state = test_helpers::test_app_state();
    let err = send(&state, Uuid::new_v4(), "   ").await.unwrap_err();
    assert!(matches!(err, ChatError::EmptyMessage));
    assert_eq!(err.error_code(), "E_EMPTY_MESSAGE");
    assert!(!err.retryable());
}

#[tokio::test]
async fn send_replies_and_records_history() {
    let state = test_helpers::test_app_state();
    test_helpers::seed_feed(&state, 20).await;
    let session = Uuid::new_v4();

    let reply = send(&state, session, "  Show critical disruptions ").await.unwrap();
    assert_eq!(reply.session_id, session);
    assert!(reply.reply.contains("Total: 20 disruptions monitored"));
    assert_eq!(reply.history_len, 3);

    let chats = state.chats.read().await;
    let messages = chats.get(session).unwrap().messages();
    assert_eq!(messages[1].content, "Show critical disruptions");
}

#[tokio::test]
async fn send_is_rate_limited() {
    let mut state = test_helpers::test_app_state();
    state.rate_limiter = RateLimiter::with_config(RateLimitConfig {
        per_client_limit: 1,
        per_client_window: Duration::from_secs(60),
        global_limit: 100,
        global_window: Duration::from_secs(60),
    });
    let session = Uuid::new_v4();

    send(&state, session, "hello").await.unwrap();
    let err = send(&state, session, "hello again").await.unwrap_err();
    assert_eq!(err.error_code(), "E_RATE_LIMITED");
    assert!(err.retryable());
}

#[tokio::test]
async fn evicted_session_drops_its_rate_limit_window() {
    let mut state = test_helpers::test_app_state();
    state.chats = std::sync::Arc::new(tokio::sync::RwLock::new(ChatSessions::with_limit(1)));
    state.rate_limiter = RateLimiter::with_config(RateLimitConfig {
        per_client_limit: 1,
        per_client_window: Duration::from_secs(60),
        global_limit: 100,
        global_window: Duration::from_secs(60),
    });
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    send(&state, a, "hello").await.unwrap();
    assert!(send(&state, a, "again").await.is_err());

    send(&state, b, "hello").await.unwrap();
    assert!(state.chats.read().await.get(a).is_none());
    // a's window went with its session, so it starts fresh.
    send(&state, a, "back again").await.unwrap();
}

#[tokio::test]
async fn prepare_counts_against_the_limit_before_answering() {
    let mut config = test_helpers::test_config();
    config.chat_delay_min = Duration::from_millis(500);
    config.chat_delay_max = Duration::from_millis(800);
    let state = crate::state::AppState::new(config);
    let session = Uuid::new_v4();

    let pending = prepare(&state, session, "  routes ").unwrap();
    assert!(pending.delay >= Duration::from_millis(500));
    assert!(state.chats.read().await.get(session).is_none());

    let reply = answer(&state, pending).await;
    assert_eq!(reply.session_id, session);
    assert_eq!(reply.history_len, 3);
}
