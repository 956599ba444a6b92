use super::*;

use crate::model::Severity;
use crate::services::feed;
use crate::state::test_helpers;

#[tokio::test]
async fn health_reports_core_agents() {
    let state = test_helpers::test_app_state();
    let Json(doc) = health(State(state)).await;
    assert_eq!(doc.status, "healthy");
    assert_eq!(doc.service, SERVICE_NAME);
    assert_eq!(doc.mode, "demo");
    assert_eq!(doc.upstream, UpstreamStatus::Disabled);
    assert_eq!(doc.agents.len(), 3);
    assert_eq!(doc.agents["Alert Agent"], AgentState::Idle);
}

#[tokio::test]
async fn routes_filter_by_status() {
    let Json(all) = list_routes(Query(RoutesQuery::default())).await.unwrap();
    assert_eq!(all.len(), catalog::ROUTES.len());

    let Json(all_keyword) = list_routes(Query(RoutesQuery { status: Some("all".into()) })).await.unwrap();
    assert_eq!(all_keyword, all);

    let Json(optimal) = list_routes(Query(RoutesQuery { status: Some("Optimal".into()) })).await.unwrap();
    assert_eq!(optimal.len(), 3);
    assert!(optimal.iter().all(|r| r.status == RouteStatus::Optimal));

    let err = list_routes(Query(RoutesQuery { status: Some("sunk".into()) })).await.unwrap_err();
    assert_eq!(err, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analytics_summarizes_current_feed() {
    let state = test_helpers::test_app_state();
    test_helpers::seed_feed(&state, 40).await;

    let Json(body) = analytics(State(state)).await;
    assert_eq!(body.summary.total, 40);
    assert_eq!(body.summary.by_severity.values().sum::<usize>(), 40);
    assert_eq!(body.route_performance.len(), 5);

    let json = serde_json::to_value(&body).unwrap();
    assert!(json.get("routePerformance").is_some());
    assert!(json.get("predictionAccuracy").is_some());
}

#[tokio::test]
async fn insights_count_critical_records() {
    let state = test_helpers::test_app_state();
    state.feed.write().await.seed(vec![
        test_helpers::disruption("disruption-1", Severity::Critical, "a"),
        test_helpers::disruption("disruption-2", Severity::Low, "b"),
    ]);
    let Json(tiles) = insights(State(state)).await;
    assert_eq!(tiles.len(), 8);
    assert_eq!(tiles[7].value, "1");
}

#[tokio::test]
async fn map_echoes_token_and_points() {
    let mut config = test_helpers::test_config();
    config.map_token = Some("pk.test".into());
    let state = AppState::new(config);
    test_helpers::seed_feed(&state, 6).await;

    let Json(body) = map(State(state)).await;
    assert_eq!(body.points.len(), 6);
    assert!(body.points.iter().all(|p| p.label == p.severity.label()));
    assert_eq!(body.map_token.as_deref(), Some("pk.test"));
}

#[tokio::test]
async fn agents_list_profiles_and_activity() {
    let state = test_helpers::test_app_state();
    let Json(body) = agents(State(state.clone())).await;
    assert_eq!(body.agents.len(), 3);
    assert_eq!(body.profiles.len(), AGENT_PROFILES.len());

    crate::services::agents::rotate_activity(&state).await;
    let Json(activity) = agent_activity(State(state)).await;
    assert_eq!(activity.len(), 1);
}

#[tokio::test]
async fn alerts_follow_published_disruptions() {
    let state = test_helpers::test_app_state();
    feed::publish(&state, test_helpers::disruption("disruption-5", Severity::High, "x")).await;

    let Json(body) = alerts(State(state.clone())).await;
    assert_eq!(body.alerts.len(), 1);
    assert_eq!(body.active, 1);
    assert_eq!(body.alerts[0].disruption_id, "disruption-5");

    let id = body.alerts[0].id.clone();
    let Json(resolution) = alert_resolution(State(state.clone()), Path(id.clone())).await.unwrap();
    assert_eq!(resolution.alert_id, id);

    let err = alert_resolution(State(state), Path("alert-999".into())).await.unwrap_err();
    assert_eq!(err, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_are_static() {
    let Json(m) = metrics().await;
    assert_eq!(m, METRICS);
}
