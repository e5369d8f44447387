//! Read projections of a session for display.
//!
//! These are what the REST surface and the CLI render. They are built from a
//! `Session` snapshot and never feed back into it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Attempt, Mode, Session, SessionId, SessionStatus, WordResult};
use crate::scoring;

/// Returned by session creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: SessionId,
    pub total_words: usize,
    pub current_word_index: usize,
    pub current_word: String,
    pub mode: Mode,
}

/// Where a learner currently is in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub session_id: SessionId,
    pub total_words: usize,
    pub current_word_index: usize,
    /// `None` once the session is completed.
    pub current_word: Option<String>,
    pub mode: Mode,
    pub status: SessionStatus,
    /// Percent of words answered; 100 once the session is completed.
    pub progress: u32,
    pub completed_words: usize,
}

impl From<&Session> for ProgressView {
    fn from(s: &Session) -> Self {
        let progress = if s.is_completed() {
            100
        } else {
            scoring::percent(s.current_word_index(), s.total_words())
        };
        Self {
            session_id: s.session_id().clone(),
            total_words: s.total_words(),
            current_word_index: s.current_word_index(),
            current_word: s.current_word().map(str::to_string),
            mode: s.mode(),
            status: s.status(),
            progress,
            completed_words: s.completed_words(),
        }
    }
}

/// What the engine decided after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    Retry,
    NextWord,
    QuizCompleted,
}

/// The two scores of an attempt, echoed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptScores {
    pub pronunciation_score: f64,
    pub spelling_score: f64,
}

/// Result of submitting an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutcome {
    pub is_correct: bool,
    pub feedback: String,
    pub scores: AttemptScores,
    pub next_action: NextAction,
    pub next_word: Option<String>,
    pub progress: u32,
    pub attempts_left: u32,
}

/// Per-word detail in a results view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDetail {
    pub word: String,
    pub final_score: Option<f64>,
    pub attempt_count: usize,
    pub completed: bool,
    pub best_attempt: Option<Attempt>,
}

impl From<&WordResult> for WordDetail {
    fn from(w: &WordResult) -> Self {
        Self {
            word: w.word().to_string(),
            final_score: w.final_score(),
            attempt_count: w.attempts().len(),
            completed: w.is_completed(),
            best_attempt: scoring::best_attempt(w.attempts()).cloned(),
        }
    }
}

/// Outcome of a session, meaningful once completed but valid at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub session_id: SessionId,
    pub overall_score: Option<i64>,
    pub total_words: usize,
    pub completed_words: usize,
    pub correct_words: usize,
    pub mode: Mode,
    pub status: SessionStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub word_details: Vec<WordDetail>,
}

impl From<&Session> for ResultsView {
    fn from(s: &Session) -> Self {
        Self {
            session_id: s.session_id().clone(),
            overall_score: s.overall_score(),
            total_words: s.total_words(),
            completed_words: s.completed_words(),
            correct_words: s.correct_words(),
            mode: s.mode(),
            status: s.status(),
            completed_at: s.completed_at(),
            word_details: s.word_results().iter().map(WordDetail::from).collect(),
        }
    }
}

/// Summary of a past session in a history listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub session_id: SessionId,
    /// 0 until the session is completed.
    pub overall_score: i64,
    pub total_words: usize,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub mode: Mode,
    pub status: SessionStatus,
}

impl From<&Session> for HistoryEntry {
    fn from(s: &Session) -> Self {
        Self {
            session_id: s.session_id().clone(),
            overall_score: s.overall_score().unwrap_or(0),
            total_words: s.total_words(),
            completed_at: s.completed_at(),
            created_at: s.created_at(),
            mode: s.mode(),
            status: s.status(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

impl Pagination {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        Self {
            page,
            limit,
            total,
            pages: total.div_ceil(limit.max(1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub history: Vec<HistoryEntry>,
    pub pagination: Pagination,
}

/// Aggregate practice statistics for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_quizzes: usize,
    pub completed_quizzes: usize,
    pub total_words: usize,
    pub total_attempts: usize,
    pub correct_words: usize,
    /// Rounded mean overall score over completed quizzes.
    pub average_score: i64,
}
