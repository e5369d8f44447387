//! Configuration loading and collaborator factories.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use vocabquiz_core::request::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use vocabquiz_core::traits::{Evaluator, SessionStore};
use vocabquiz_core::{EngineConfig, HistoryConfig, MemoryStore};

use crate::file_store::JsonFileStore;
use crate::http::HttpEvaluator;
use crate::mock::MockEvaluator;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Allowed CORS origin. Any origin when unset.
    #[serde(default)]
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            api_prefix: default_api_prefix(),
            cors_origin: None,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}
fn default_api_prefix() -> String {
    "/api".to_string()
}

/// Where sessions are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    #[default]
    Memory,
    File {
        #[serde(default = "default_store_path")]
        path: PathBuf,
    },
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./vocabquiz-data")
}

/// Evaluation provider settings.
///
/// Note: Custom Debug impl masks the API key to keep it out of logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EvaluatorConfig {
    Http {
        base_url: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
    Mock,
}

impl std::fmt::Debug for EvaluatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluatorConfig::Http {
                base_url,
                api_key,
                timeout_secs,
            } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .field("timeout_secs", timeout_secs)
                .finish(),
            EvaluatorConfig::Mock => f.write_str("Mock"),
        }
    }
}

/// Top-level vocabquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabQuizConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    /// No evaluator means transcripts cannot be answered, only scored attempts.
    #[serde(default)]
    pub evaluator: Option<EvaluatorConfig>,
    /// Re-runs of an attempt after losing a version race.
    #[serde(default = "default_retries")]
    pub max_update_retries: u32,
    /// Initial backoff between re-runs in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_history_limit")]
    pub history_default_limit: usize,
    #[serde(default = "default_history_max")]
    pub history_max_limit: usize,
}

fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    10
}
fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}
fn default_history_max() -> usize {
    MAX_HISTORY_LIMIT
}

impl Default for VocabQuizConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            evaluator: None,
            max_update_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            history_default_limit: default_history_limit(),
            history_max_limit: default_history_max(),
        }
    }
}

impl VocabQuizConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_update_retries: self.max_update_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig {
            default_limit: self.history_default_limit,
            max_limit: self.history_max_limit,
        }
    }

    /// Check values that parse fine but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.history_default_limit == 0 {
            anyhow::bail!("history_default_limit must be at least 1");
        }
        if self.history_default_limit > self.history_max_limit {
            anyhow::bail!(
                "history_default_limit ({}) exceeds history_max_limit ({})",
                self.history_default_limit,
                self.history_max_limit
            );
        }
        if !self.server.api_prefix.is_empty() && !self.server.api_prefix.starts_with('/') {
            anyhow::bail!(
                "server.api_prefix must start with '/': {}",
                self.server.api_prefix
            );
        }
        if let Some(EvaluatorConfig::Http { base_url, .. }) = &self.evaluator {
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                anyhow::bail!("evaluator.base_url must be an http(s) URL: {base_url}");
            }
        }
        Ok(())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Expand `${VAR}` references in one pass. Substituted values are not
/// scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_evaluator_config(config: &EvaluatorConfig) -> EvaluatorConfig {
    match config {
        EvaluatorConfig::Http {
            base_url,
            api_key,
            timeout_secs,
        } => EvaluatorConfig::Http {
            base_url: resolve_env_vars(base_url),
            api_key: api_key.as_deref().map(resolve_env_vars),
            timeout_secs: *timeout_secs,
        },
        EvaluatorConfig::Mock => EvaluatorConfig::Mock,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `vocabquiz.toml` in the current directory
/// 2. `~/.config/vocabquiz/config.toml`
///
/// Environment variable overrides: `VOCABQUIZ_BIND`, `VOCABQUIZ_EVALUATOR_KEY`.
pub fn load_config() -> Result<VocabQuizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<VocabQuizConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("vocabquiz.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => VocabQuizConfig::default(),
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML document and resolve `${VAR}` references.
pub fn parse_config(content: &str) -> Result<VocabQuizConfig> {
    let mut config: VocabQuizConfig = toml::from_str(content)?;
    config.evaluator = config.evaluator.as_ref().map(resolve_evaluator_config);
    config.server.bind = resolve_env_vars(&config.server.bind);
    if let StoreConfig::File { path } = &mut config.store {
        let resolved = resolve_env_vars(&path.to_string_lossy());
        *path = PathBuf::from(resolved);
    }
    Ok(config)
}

fn apply_env_overrides(config: &mut VocabQuizConfig) {
    if let Ok(bind) = std::env::var("VOCABQUIZ_BIND") {
        config.server.bind = bind;
    }
    if let Ok(key) = std::env::var("VOCABQUIZ_EVALUATOR_KEY") {
        if let Some(EvaluatorConfig::Http { api_key, .. }) = &mut config.evaluator {
            *api_key = Some(key);
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("vocabquiz"))
}

/// Create the session store described by `config`.
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn SessionStore>> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreConfig::File { path } => {
            let store = JsonFileStore::open(path)
                .await
                .with_context(|| format!("failed to open session store at {}", path.display()))?;
            Ok(Arc::new(store))
        }
    }
}

/// Create an evaluator instance from its configuration.
pub fn create_evaluator(config: &EvaluatorConfig) -> Result<Arc<dyn Evaluator>> {
    match config {
        EvaluatorConfig::Http {
            base_url,
            api_key,
            timeout_secs,
        } => Ok(Arc::new(HttpEvaluator::new(
            base_url,
            api_key.clone(),
            *timeout_secs,
        )?)),
        EvaluatorConfig::Mock => Ok(Arc::new(MockEvaluator::new())),
    }
}
