// src/api/mod.rs - HTTP API that drives coaching sessions from a web client

pub mod auth;
pub mod handlers;
pub mod sessions;
pub mod types;

use axum::routing::{get, post};
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::cors::CorsLayer;

use crate::coach::prompts::CoachingMode;
use crate::coach::CoachService;
use crate::infra::config::{ApiConfig, CoachConfig};
pub use sessions::SessionTable;

/// Session settings applied when a client does not override them.
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    pub mode: CoachingMode,
    pub sections: Vec<String>,
    pub autosave: bool,
}

impl From<&CoachConfig> for SessionDefaults {
    fn from(c: &CoachConfig) -> Self {
        Self {
            mode: c.mode,
            sections: c.sections.clone(),
            autosave: c.autosave,
        }
    }
}

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<CoachService>,
    pub sessions: SessionTable,
    pub defaults: SessionDefaults,
    pub token: Option<String>,
}

impl ApiState {
    pub fn new(service: Arc<CoachService>, defaults: SessionDefaults, token: Option<String>) -> Self {
        Self {
            service,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            defaults,
            token,
        }
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/api/v1/sessions", post(handlers::create_session))
        .route(
            "/api/v1/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/v1/sessions/{id}/events", post(handlers::post_event))
        .route("/api/v1/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

/// Start the API server on the given port (blocking).
pub async fn start_server(config: &ApiConfig, state: ApiState) -> anyhow::Result<()> {
    let addr = format!("127.0.0.1:{}", config.port);
    // Browsers that close without DELETE leave sessions behind.
    let sweeper = (config.session_idle_secs > 0).then(|| {
        tokio::spawn(sessions::run_idle_sweeper(
            state.sessions.clone(),
            Duration::from_secs(config.session_idle_secs),
        ))
    });
    let router = build_router(state);

    tracing::info!("API server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    if let Some(task) = sweeper {
        task.abort();
    }
    Ok(())
}
