//! The `vocabquiz results` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use vocabquiz_core::model::SessionId;
use vocabquiz_core::SessionEngine;
use vocabquiz_providers::config::{create_store, load_config_from};

pub async fn execute(session: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = create_store(&config.store).await?;
    let engine = SessionEngine::new(store, config.engine_config());

    let results = engine.results(&SessionId::from(session)).await?;

    println!(
        "Session {} ({}, {})",
        results.session_id, results.mode, results.status
    );
    match results.overall_score {
        Some(score) => println!("Overall score: {score}"),
        None => println!("Overall score: pending"),
    }
    println!(
        "Words: {}/{} completed, {} correct",
        results.completed_words, results.total_words, results.correct_words
    );
    if let Some(at) = results.completed_at {
        println!("Completed at: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    let mut table = Table::new();
    table.set_header(vec!["Word", "Attempts", "Final", "Best (p/s)", "Done"]);
    for detail in &results.word_details {
        let best = detail
            .best_attempt
            .as_ref()
            .map(|a| format!("{:.0}/{:.0}", a.pronunciation_score, a.spelling_score))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&detail.word),
            Cell::new(detail.attempt_count),
            Cell::new(
                detail
                    .final_score
                    .map(|s| format!("{s:.1}"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(best),
            Cell::new(if detail.completed { "yes" } else { "no" }),
        ]);
    }
    println!("{table}");

    Ok(())
}
