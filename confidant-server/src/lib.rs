//! HTTP surface for the Confidant companion
//!
//! Stateless per request: the client sends the message history with every
//! turn and receives the extended history back.

pub mod chat;
pub mod error;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    http::HeaderValue,
    routing::{get, post},
};
use clap::Parser;
use confidant_core::config::ConfidantConfig;
use confidant_core::conversation::GenerationSettings;
use confidant_core::llm::{LLMProvider, LLMProviderFactory};
use confidant_core::memory::{MemoryAdapter, adapter_from_config};
use confidant_core::persona::resolve_persona;
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Debug, Parser)]
#[command(name = "confidant-server")]
#[command(about = "HTTP chat endpoint for the Confidant companion", long_about = None)]
#[command(version)]
pub struct ServerArgs {
    /// Explicit config file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Listen address, overriding `server.bind`
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}

impl ServerArgs {
    /// Load configuration and apply command-line overrides
    pub fn load_config(&self) -> confidant_core::error::Result<ConfidantConfig> {
        let mut config = ConfidantConfig::load(self.config.as_deref())?;
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        Ok(config)
    }
}

/// Resolve when `signal` fires. A signal that cannot be listened for never
/// resolves, so the server keeps running instead of stopping at startup.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => tracing::info!("Shutting down"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub persona: Arc<str>,
    pub provider: Arc<dyn LLMProvider>,
    pub memory: Option<MemoryAdapter>,
    pub settings: GenerationSettings,
}

impl AppState {
    pub fn from_config(config: &ConfidantConfig) -> confidant_core::error::Result<Self> {
        Ok(Self {
            persona: Arc::from(resolve_persona(&config.persona)?),
            provider: LLMProviderFactory::create(&config.llm),
            memory: adapter_from_config(&config.memory)?,
            settings: GenerationSettings::from(&config.llm),
        })
    }
}

pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat::chat))
        .layer(build_cors_layer(cors_origins))
        .with_state(state)
}

pub fn build_cors_layer(cors_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if cors_origins.is_empty() || cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use confidant_core::llm::ScriptedCompanionProvider;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState {
            persona: Arc::from("persona"),
            provider: Arc::new(ScriptedCompanionProvider::new()),
            memory: None,
            settings: GenerationSettings::default(),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let response = build_router(state(), &[])
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let origins = vec!["http://localhost:5173".to_string()];
        let response = build_router(state(), &origins)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("Origin", "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );
    }

    #[test]
    fn test_args_parse() {
        let args = ServerArgs::try_parse_from([
            "confidant-server",
            "--config",
            "/etc/confidant.toml",
            "--bind",
            "0.0.0.0:8080",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/etc/confidant.toml")));
        assert_eq!(args.bind.as_deref(), Some("0.0.0.0:8080"));

        let args = ServerArgs::try_parse_from(["confidant-server"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.bind.is_none());
    }

    #[test]
    fn test_stray_argument_is_rejected() {
        assert!(ServerArgs::try_parse_from(["confidant-server", "confidant.toml"]).is_err());
    }

    #[test]
    fn test_bind_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("confidant.toml");
        std::fs::write(&path, "[server]\nbind = \"127.0.0.1:4000\"\n").unwrap();

        let args = ServerArgs {
            config: Some(path.clone()),
            bind: None,
        };
        assert_eq!(args.load_config().unwrap().server.bind, "127.0.0.1:4000");

        let args = ServerArgs {
            config: Some(path),
            bind: Some("0.0.0.0:9000".to_string()),
        };
        assert_eq!(args.load_config().unwrap().server.bind, "0.0.0.0:9000");
    }

    #[tokio::test]
    async fn test_shutdown_on_signal() {
        let done = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            shutdown_on(async { Ok(()) }),
        )
        .await;
        assert!(done.is_ok());
    }

    #[tokio::test]
    async fn test_failed_signal_keeps_serving() {
        let done = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            shutdown_on(async { Err(std::io::Error::other("no signal handler")) }),
        )
        .await;
        assert!(done.is_err());
    }

    #[test]
    fn test_state_from_default_config() {
        let mut config = ConfidantConfig::default();
        config.memory.enabled = false;
        let state = AppState::from_config(&config).unwrap();
        assert!(state.memory.is_none());
        assert!(state.persona.contains("Confidant"));
    }
}
