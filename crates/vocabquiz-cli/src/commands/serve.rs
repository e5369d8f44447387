//! The `vocabquiz serve` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use vocabquiz_core::{HistoryQuery, SessionEngine};
use vocabquiz_providers::config::{create_evaluator, create_store, load_config_from};
use vocabquiz_server::{build_router, serve, AppState, RouterOptions};

pub async fn execute(config_path: Option<PathBuf>, bind: Option<String>) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    config.validate()?;

    let store = create_store(&config.store).await?;
    let mut engine = SessionEngine::new(store.clone(), config.engine_config());
    match &config.evaluator {
        Some(evaluator) => {
            let evaluator = create_evaluator(evaluator)?;
            info!(evaluator = evaluator.name(), "evaluation provider configured");
            engine = engine.with_evaluator(evaluator);
        }
        None => info!("no evaluation provider configured; answer endpoint disabled"),
    }
    let history = HistoryQuery::new(store.clone(), config.history_config());
    info!(store = store.name(), "session store ready");

    let router = build_router(
        AppState::new(engine, history),
        &RouterOptions {
            api_prefix: config.server.api_prefix.clone(),
            cors_origin: config.server.cors_origin.clone(),
        },
    )?;

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    serve(listener, router).await
}
