use super::*;
use crate::config::UpstreamConfig;

#[tokio::test]
async fn new_state_is_empty() {
    let state = test_helpers::test_app_state();
    assert!(state.feed.read().await.is_empty());
    assert!(state.clients.read().await.is_empty());
    assert_eq!(state.feed.read().await.capacity(), 50);
    assert_eq!(*state.upstream.read().await, UpstreamStatus::Disabled);
}

#[tokio::test]
async fn upstream_configured_starts_connecting() {
    let mut config = test_helpers::test_config();
    config.upstream = UpstreamConfig { api_url: Some("http://127.0.0.1:9".into()), ..UpstreamConfig::default() };
    let state = AppState::new(config);
    assert_eq!(*state.upstream.read().await, UpstreamStatus::Connecting);

    state.set_upstream_status(UpstreamStatus::Offline).await;
    assert_eq!(*state.upstream.read().await, UpstreamStatus::Offline);
}

#[tokio::test]
async fn seed_feed_fills_store() {
    let state = test_helpers::test_app_state();
    let records = test_helpers::seed_feed(&state, 20).await;
    assert_eq!(records.len(), 20);
    assert_eq!(state.feed.read().await.len(), 20);
}

#[test]
fn upstream_status_serializes_lowercase() {
    assert_eq!(serde_json::to_value(UpstreamStatus::Online).unwrap(), "online");
    assert_eq!(serde_json::to_value(UpstreamStatus::Disabled).unwrap(), "disabled");
}
