use anyhow::Context;
use axum::{Router, routing::get};
use clap::Parser;
use semaphore_server::signaling::{AppState, SignalingService, ws_handler};
use semaphore_server::{ServerConfig, SessionManager};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "semaphore-server", about = "WebRTC signaling server")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "semaphore.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(&cli.config)?;

    let signaling = SignalingService::new(config.signaling.ice_servers.clone());
    let sessions = SessionManager::new(
        Arc::new(signaling.clone()),
        config.limits.violation_limit,
    );

    let state = Arc::new(AppState {
        signaling,
        sessions,
        idle_timeout: config.idle_timeout(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ws/{session}", get(ws_handler))
        .layer(cors)
        .with_state(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("signaling server listening on {addr}");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
