use super::*;

use std::time::Duration;

use chrono::TimeZone;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::timeout;

use crate::state::test_helpers;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 12, 12, 0, 0).unwrap()
}

#[test]
fn board_starts_with_three_core_agents() {
    let board = AgentBoard::new();
    let statuses = board.statuses();
    let names: Vec<_> = statuses.iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Prediction Agent", "Optimization Agent", "Alert Agent"]);
    assert_eq!(statuses[2].status, AgentState::Idle);
    assert_eq!(statuses[0].tasks_completed, 1247);
    assert!(board.activity().is_empty());
}

#[test]
fn sample_activity_draws_from_tables() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..300 {
        let a = sample_activity(&mut rng, now());
        assert!(AGENT_NAMES.contains(&a.agent));
        assert!(ACTIONS.iter().any(|(action, details)| *action == a.action && *details == a.details));
        seen.insert(a.status);
    }
    assert_eq!(seen.len(), 3);
}

#[test]
fn activity_log_is_capped_newest_first() {
    let mut board = AgentBoard::new();
    let mut rng = StdRng::seed_from_u64(9);
    let mut last = None;
    for _ in 0..(ACTIVITY_LOG_CAP + 7) {
        let a = sample_activity(&mut rng, now());
        last = Some(a.clone());
        board.record(a);
    }
    let log = board.activity();
    assert_eq!(log.len(), ACTIVITY_LOG_CAP);
    assert_eq!(Some(&log[0]), last.as_ref());
}

#[test]
fn counters_grow_by_at_most_two() {
    let mut board = AgentBoard::new();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..50 {
        let before = board.statuses();
        board.tick_counters(&mut rng);
        for (b, a) in before.iter().zip(board.statuses()) {
            assert!(a.tasks_completed >= b.tasks_completed);
            assert!(a.tasks_completed - b.tasks_completed <= 2);
        }
    }
}

#[test]
fn activity_frame_shape() {
    let a = sample_activity(&mut StdRng::seed_from_u64(1), now());
    let frame = activity_frame(&a);
    assert_eq!(frame.syscall, "agent:activity");
    assert_eq!(frame.from.as_deref(), Some("agents"));
    assert_eq!(frame.data["activity"]["agent"], a.agent);
}

#[tokio::test]
async fn rotate_activity_records_and_broadcasts() {
    let state = test_helpers::test_app_state();
    let mut rx = hub::register(&state, uuid::Uuid::new_v4()).await;

    let activity = rotate_activity(&state).await;

    let frame = timeout(Duration::from_millis(200), rx.recv()).await.unwrap().unwrap();
    assert_eq!(frame.syscall, "agent:activity");
    assert_eq!(state.agents.read().await.activity()[0], activity);
}

#[tokio::test]
async fn spawned_task_rotates() {
    let mut config = test_helpers::test_config();
    config.agent_tick = Duration::from_millis(5);
    config.agent_status_tick = Duration::from_millis(5);
    let state = AppState::new(config);
    let handle = spawn_agent_task(state.clone());

    timeout(Duration::from_secs(2), async {
        while state.agents.read().await.activity().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("activity should appear");

    handle.abort();
}
