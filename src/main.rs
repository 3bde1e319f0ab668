//! Boardroom - multi-persona product discussion service
//!
//! Simulates a CEO, a Marketing Intern and a Marketing Strategist debating a
//! product, one model call per turn, and serves the transcripts over HTTP
//! and Slack.

mod api;
mod boardroom;
mod config;
mod format;
mod llm;
mod persona;
mod slack;

#[cfg(test)]
mod testing;

use api::{create_router, AppState};
use config::AppConfig;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boardroom=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env()?;

    let llm = llm::build_service(&config.llm);
    if config.llm.api_key.is_some() {
        tracing::info!(model = %llm.model_id(), "Model client initialized");
    } else {
        tracing::warn!("No model API key configured. Set GEMINI_API_KEY or GEMINI_API_KEY_FILE.");
    }
    if config.slack.client_id.is_none() || config.slack.client_secret.is_none() {
        tracing::warn!("Slack OAuth credentials not configured; app installation will fail");
    }

    let port = config.port;
    let state = AppState::new(config, llm);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Boardroom server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
