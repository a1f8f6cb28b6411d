mod api;
mod app;
mod auth;
mod config;
mod error;
mod journal;
mod listing;
mod resources;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "nutricare_portal=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;
    tracing::info!(
        api_base_url = %app_state.config.api_base_url,
        persistent_tokens = app_state.config.token_store_path.is_some(),
        "portal state ready"
    );

    auth::services::spawn_session_sweeper(
        app_state.clone(),
        std::time::Duration::from_secs(app_state.config.session_sweep_secs),
    );

    let app = app::build_app(app_state);
    app::serve(app).await
}
