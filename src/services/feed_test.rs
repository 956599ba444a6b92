use super::*;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::timeout;

use crate::model::Severity;
use crate::state::test_helpers::{self, disruption};

#[test]
fn push_front_prepends_and_caps() {
    let mut store = FeedStore::new(3);
    for n in 1..=10 {
        store.push_front(disruption(&format!("disruption-{n}"), Severity::Low, "x"));
        assert!(store.len() <= 3);
    }
    let ids: Vec<_> = store.snapshot().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["disruption-10", "disruption-9", "disruption-8"]);
}

#[test]
fn next_seq_never_reuses_evicted_ids() {
    let mut store = FeedStore::new(2);
    store.seed(vec![
        disruption("disruption-5", Severity::Low, "a"),
        disruption("disruption-4", Severity::Low, "b"),
    ]);
    assert_eq!(store.next_seq(), 6);
    assert_eq!(store.next_seq(), 7);

    store.push_front(disruption("disruption-20", Severity::High, "c"));
    assert_eq!(store.next_seq(), 21);
}

#[test]
fn seed_truncates_to_capacity() {
    let mut store = FeedStore::new(5);
    let records = (1..=8)
        .map(|n| disruption(&format!("disruption-{n}"), Severity::Medium, "m"))
        .collect();
    store.seed(records);
    assert_eq!(store.len(), 5);
    assert_eq!(store.latest().map(|d| d.id.as_str()), Some("disruption-1"));
}

#[test]
fn merge_front_keeps_limited_previous() {
    let mut store = FeedStore::new(10);
    store.seed(
        (1..=6)
            .map(|n| disruption(&format!("old-{n}"), Severity::Low, "old"))
            .collect(),
    );

    store.merge_front(
        vec![
            disruption("new-1", Severity::High, "new"),
            disruption("new-2", Severity::High, "new"),
        ],
        3,
    );

    let ids: Vec<_> = store.snapshot().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["new-1", "new-2", "old-1", "old-2", "old-3"]);
}

#[test]
fn merge_front_respects_capacity() {
    let mut store = FeedStore::new(4);
    let batch = (1..=6)
        .map(|n| disruption(&format!("disruption-{n}"), Severity::Low, "b"))
        .collect();
    store.merge_front(batch, UPSTREAM_KEEP_PREVIOUS);
    assert_eq!(store.len(), 4);
    assert_eq!(store.next_seq(), 7);
}

#[test]
fn zero_capacity_is_bumped_to_one() {
    let mut store = FeedStore::new(0);
    store.push_front(disruption("disruption-1", Severity::Low, "a"));
    store.push_front(disruption("disruption-2", Severity::Low, "b"));
    assert_eq!(store.capacity(), 1);
    assert_eq!(store.len(), 1);
}

#[test]
fn get_finds_by_id() {
    let mut store = FeedStore::new(5);
    store.push_front(disruption("disruption-1", Severity::Critical, "a"));
    assert_eq!(store.get("disruption-1").map(|d| d.severity), Some(Severity::Critical));
    assert!(store.get("disruption-99").is_none());
}

#[test]
fn next_interval_stays_within_bounds() {
    let mut rng = StdRng::seed_from_u64(17);
    let timing = FeedTiming {
        min_interval: Duration::from_secs(10),
        max_interval: Duration::from_secs(30),
        startup_delay: Duration::ZERO,
    };
    for _ in 0..200 {
        let wait = next_interval(&mut rng, timing);
        assert!(wait >= timing.min_interval && wait <= timing.max_interval);
    }

    let fixed = FeedTiming { max_interval: Duration::from_secs(10), ..timing };
    assert_eq!(next_interval(&mut rng, fixed), Duration::from_secs(10));
}

#[tokio::test]
async fn cap_holds_after_many_ticks() {
    let state = test_helpers::test_app_state();
    test_helpers::seed_feed(&state, 50).await;

    for _ in 0..200 {
        inject_random(&state).await;
        assert!(state.feed.read().await.len() <= state.config.feed_capacity);
    }
    assert_eq!(state.feed.read().await.len(), state.config.feed_capacity);
}

#[tokio::test]
async fn inject_broadcasts_update_and_raises_alert() {
    let state = test_helpers::test_app_state();
    let mut rx = hub::register(&state, uuid::Uuid::new_v4()).await;

    let injected = inject_random(&state).await;

    let frame = timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("update frame timed out")
        .expect("channel closed");
    assert_eq!(frame.syscall, "disruption:update");
    assert_eq!(frame.from.as_deref(), Some("feed"));
    assert_eq!(frame.data["disruption"]["id"], injected.id.as_str());

    assert_eq!(state.feed.read().await.latest().map(|d| d.id.clone()), Some(injected.id.clone()));
    assert_eq!(state.alerts.read().await.len(), 1);
}

#[tokio::test]
async fn find_reports_missing_ids() {
    let state = test_helpers::test_app_state();
    let records = test_helpers::seed_feed(&state, 5).await;

    assert_eq!(find(&state, &records[0].id).await.unwrap(), records[0]);
    let err = find(&state, "disruption-999").await.unwrap_err();
    assert_eq!(crate::frame::ErrorCode::error_code(&err), "E_DISRUPTION_NOT_FOUND");
}

#[tokio::test]
async fn spawned_ticker_publishes() {
    let state = test_helpers::test_app_state();
    let handle = spawn_feed_task(state.clone());

    timeout(Duration::from_secs(2), async {
        while state.feed.read().await.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("ticker should publish quickly with test timings");

    handle.abort();
}
