//! The `vocabquiz history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use vocabquiz_core::request::HistoryParams;
use vocabquiz_core::HistoryQuery;
use vocabquiz_providers::config::{create_store, load_config_from};

pub async fn execute(
    user: String,
    page: Option<usize>,
    limit: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = create_store(&config.store).await?;
    let query = HistoryQuery::new(store, config.history_config());

    let listed = query.history(&user, HistoryParams { page, limit }).await?;
    if listed.history.is_empty() {
        println!("No quiz sessions for user {user}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Session", "Created", "Mode", "Status", "Words", "Score"]);
    for entry in &listed.history {
        table.add_row(vec![
            entry.session_id.to_string(),
            entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
            entry.mode.to_string(),
            entry.status.to_string(),
            entry.total_words.to_string(),
            entry.overall_score.to_string(),
        ]);
    }
    println!("{table}");

    let p = listed.pagination;
    println!(
        "Page {} of {} ({} session(s) total)",
        p.page, p.pages, p.total
    );

    Ok(())
}
