//! The `vocabquiz init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    let path = Path::new("vocabquiz.toml");
    if path.exists() {
        println!("vocabquiz.toml already exists, skipping.");
        return Ok(());
    }
    std::fs::write(path, SAMPLE_CONFIG).context("failed to write vocabquiz.toml")?;
    println!("Created vocabquiz.toml");

    println!("\nNext steps:");
    println!("  1. Point [evaluator] at your evaluation service, or keep the mock");
    println!("  2. Run: vocabquiz validate");
    println!("  3. Run: vocabquiz serve");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# vocabquiz configuration

max_update_retries = 3
retry_delay_ms = 10
history_default_limit = 10
history_max_limit = 100

[server]
bind = "127.0.0.1:3000"
api_prefix = "/api"
# cors_origin = "http://localhost:5173"

[store]
type = "file"
path = "./vocabquiz-data"

[evaluator]
type = "mock"

# [evaluator]
# type = "http"
# base_url = "http://localhost:5000/api/speech"
# api_key = "${VOCABQUIZ_EVALUATOR_KEY}"
# timeout_secs = 30
"#;
