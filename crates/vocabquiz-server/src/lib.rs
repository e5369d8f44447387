//! vocabquiz-server: REST surface over the quiz session engine.
//!
//! JSON bodies use camelCase fields. Successful responses carry
//! `success: true` plus one projection; failures carry
//! `{success: false, error, kind}` with a status chosen by the error kind.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use vocabquiz_core::{HistoryQuery, SessionEngine};

pub use error::ApiError;

/// Shared state handed to every handler.
pub struct AppState {
    pub engine: SessionEngine,
    pub history: HistoryQuery,
}

impl AppState {
    pub fn new(engine: SessionEngine, history: HistoryQuery) -> Arc<Self> {
        Arc::new(Self { engine, history })
    }
}

/// Routing options taken from the `[server]` configuration section.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Prefix for the quiz routes, e.g. `/api`. Empty mounts them at the root.
    pub api_prefix: String,
    /// Allowed CORS origin. Any origin when `None`.
    pub cors_origin: Option<String>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            api_prefix: "/api".into(),
            cors_origin: None,
        }
    }
}

fn quiz_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quiz/create", post(handlers::create_quiz))
        .route("/quiz/{session_id}", get(handlers::get_quiz))
        .route("/quiz/{session_id}/attempt", post(handlers::submit_attempt))
        .route("/quiz/{session_id}/answer", post(handlers::answer))
        .route("/quiz/{session_id}/results", get(handlers::get_results))
        .route("/quiz/user/{user_id}/history", get(handlers::user_history))
        .route("/quiz/user/{user_id}/stats", get(handlers::user_stats))
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>, options: &RouterOptions) -> Result<Router> {
    let cors = match &options.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                HeaderValue::from_str(origin)
                    .with_context(|| format!("invalid CORS origin: {origin}"))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    };

    let prefix = options.api_prefix.trim_end_matches('/');
    let router = Router::new().route("/health", get(handlers::health));
    let router = if prefix.is_empty() {
        router.merge(quiz_routes())
    } else {
        router.nest(prefix, quiz_routes())
    };

    Ok(router
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Serve `router` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    let addr = listener.local_addr().context("listener has no local address")?;
    info!(%addr, "vocabquiz server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("vocabquiz server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}
