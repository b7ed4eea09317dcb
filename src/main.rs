mod app;
mod auth;
mod config;
mod db;
mod error;
mod github;
#[cfg(test)]
mod memory;
mod posts;
mod profiles;
mod state;
mod validation;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "devconnect=debug,axum=info,tower_http=info".to_string());
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

    let state = match AppState::init().await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = ?e, "startup failed");
            return Err(e);
        }
    };

    let (host, port) = (state.config.host.clone(), state.config.port);
    let app = app::build_app(state);
    app::serve(app, &host, port).await
}
