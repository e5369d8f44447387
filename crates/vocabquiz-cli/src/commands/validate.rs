//! The `vocabquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use vocabquiz_providers::config::{create_evaluator, load_config_from};
use vocabquiz_providers::{EvaluatorConfig, StoreConfig};

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    config.validate()?;

    println!("Server: {}{}", config.server.bind, config.server.api_prefix);
    match &config.store {
        StoreConfig::Memory => println!("Store: memory (sessions are lost on exit)"),
        StoreConfig::File { path } => println!("Store: file ({})", path.display()),
    }
    match &config.evaluator {
        None => println!("Evaluator: none (answer endpoint disabled)"),
        Some(evaluator) => {
            let built = create_evaluator(evaluator)?;
            match evaluator {
                EvaluatorConfig::Http { base_url, .. } => {
                    println!("Evaluator: {} ({base_url})", built.name())
                }
                EvaluatorConfig::Mock => println!("Evaluator: {}", built.name()),
            }
        }
    }
    println!(
        "History: default limit {}, max {}",
        config.history_default_limit, config.history_max_limit
    );
    println!("Config valid.");

    Ok(())
}
