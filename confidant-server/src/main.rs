//! Confidant HTTP server

use anyhow::{Context, Result};
use clap::Parser;
use confidant_server::{AppState, ServerArgs, build_router, shutdown_on};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = ServerArgs::parse();
    let config = args.load_config().context("Failed to load configuration")?;

    let state = AppState::from_config(&config).context("Failed to initialize chat service")?;
    let provider = state.provider.model_info();
    tracing::info!(
        provider = %provider.provider,
        model = %provider.model_name,
        memory = state.memory.is_some(),
        "Chat service ready"
    );

    let app = build_router(state, &config.server.cors_origins);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(addr = %config.server.bind, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await?;

    Ok(())
}
