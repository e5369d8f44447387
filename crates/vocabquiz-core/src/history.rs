//! Per-user history and practice statistics.
//!
//! Read-only projections over a `SessionStore`; no state-machine logic.

use std::sync::Arc;

use tracing::debug;

use crate::error::QuizError;
use crate::request::{HistoryParams, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use crate::scoring;
use crate::traits::SessionStore;
use crate::views::{HistoryEntry, HistoryPage, Pagination, UserStats};

/// Page-size policy for history listings.
#[derive(Debug, Clone, Copy)]
pub struct HistoryConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_HISTORY_LIMIT,
            max_limit: MAX_HISTORY_LIMIT,
        }
    }
}

/// Paginated listing of a user's past sessions.
pub struct HistoryQuery {
    store: Arc<dyn SessionStore>,
    config: HistoryConfig,
}

impl HistoryQuery {
    pub fn new(store: Arc<dyn SessionStore>, config: HistoryConfig) -> Self {
        Self { store, config }
    }

    /// Sessions of `user_id`, newest first, sliced to the requested page.
    pub async fn history(
        &self,
        user_id: &str,
        params: HistoryParams,
    ) -> Result<HistoryPage, QuizError> {
        let window = params.validate(self.config.default_limit, self.config.max_limit)?;
        let listed = self
            .store
            .list_by_user(user_id, window.offset(), window.limit)
            .await?;
        debug!(user_id, page = window.page, total = listed.total, "history listed");

        Ok(HistoryPage {
            history: listed.sessions.iter().map(HistoryEntry::from).collect(),
            pagination: Pagination::new(window.page, window.limit, listed.total),
        })
    }

    /// Totals across every session the user owns.
    pub async fn user_stats(&self, user_id: &str) -> Result<UserStats, QuizError> {
        let listed = self.store.list_by_user(user_id, 0, usize::MAX).await?;

        let completed_scores: Vec<i64> = listed
            .sessions
            .iter()
            .filter_map(|s| s.overall_score())
            .collect();

        Ok(UserStats {
            total_quizzes: listed.total,
            completed_quizzes: completed_scores.len(),
            total_words: listed.sessions.iter().map(|s| s.total_words()).sum(),
            total_attempts: listed.sessions.iter().map(|s| s.total_attempts()).sum(),
            correct_words: listed.sessions.iter().map(|s| s.correct_words()).sum(),
            average_score: scoring::mean_score(&completed_scores),
        })
    }
}
