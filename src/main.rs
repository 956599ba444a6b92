mod config;
mod frame;
mod model;
mod rate_limit;
mod routes;
mod services;
mod state;

use chrono::Utc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let port = config.port;
    let seed_count = config.seed_count;
    let state = state::AppState::new(config);

    // Mock data is always seeded; an upstream merges on top once it answers.
    let seeded = services::mock::generate_disruptions(&mut rand::rng(), seed_count, Utc::now());
    state.feed.write().await.seed(seeded);
    tracing::info!(count = seed_count, "mock disruptions seeded");

    let limits = state.rate_limiter.config();
    tracing::info!(
        per_client = limits.per_client_limit,
        per_client_window_secs = limits.per_client_window.as_secs(),
        global = limits.global_limit,
        global_window_secs = limits.global_window.as_secs(),
        "chat rate limits"
    );

    // Spawn background tasks.
    let _feed = services::feed::spawn_feed_task(state.clone());
    let _agents = services::agents::spawn_agent_task(state.clone());
    let upstream = services::upstream::spawn_upstream_sync(state.clone());
    if upstream.is_none() {
        tracing::info!("no upstream configured, serving mock data only");
    }

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "supplyscope listening");
    axum::serve(listener, app).await.expect("server failed");
}
