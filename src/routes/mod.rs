//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the REST API and the `/api/ws` websocket under a single
//! Axum router. When `STATIC_DIR` is set, a built dashboard is served from it
//! as the fallback for every non-API path.

pub mod chat;
pub mod dashboard;
pub mod disruptions;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router: REST + websocket, plus static files if configured.
pub fn app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let router = api_routes(state);
    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router,
    }
}

fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(dashboard::health))
        .route("/healthz", get(healthz))
        .route("/api/disruptions", get(disruptions::list_disruptions))
        .route("/api/disruptions/{id}", get(disruptions::get_disruption))
        .route("/api/export/{format}", get(disruptions::export))
        .route("/api/routes", get(dashboard::list_routes))
        .route("/api/metrics", get(dashboard::metrics))
        .route("/api/analytics", get(dashboard::analytics))
        .route("/api/insights", get(dashboard::insights))
        .route("/api/map", get(dashboard::map))
        .route("/api/agents", get(dashboard::agents))
        .route("/api/agents/activity", get(dashboard::agent_activity))
        .route("/api/alerts", get(dashboard::alerts))
        .route("/api/alerts/{id}", get(dashboard::alert_resolution))
        .route("/api/chat", get(chat::intro).post(chat::send_chat))
        .route("/api/ws", get(ws::handle_ws))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
