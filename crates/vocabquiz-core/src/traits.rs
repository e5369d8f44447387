//! Collaborator traits: session persistence and answer evaluation.
//!
//! `SessionStore` is implemented by `MemoryStore` in this crate and by the
//! file-backed store in `vocabquiz-providers`. `Evaluator` is implemented by
//! the HTTP and mock evaluators in `vocabquiz-providers`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{Mode, Session, SessionId};

// ---------------------------------------------------------------------------
// Session store trait
// ---------------------------------------------------------------------------

/// Durable keyed storage for sessions with conditional update.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Human-readable backend name (e.g. "memory").
    fn name(&self) -> &str;

    /// Insert a new session. Fails with `AlreadyExists` if the id is taken.
    async fn create(&self, session: &Session) -> Result<(), StoreError>;

    /// Point lookup by id.
    async fn get(&self, session_id: &SessionId) -> Result<Option<Session>, StoreError>;

    /// Replace the stored session only if its stored version still equals
    /// `expected_version`. Fails with `VersionMismatch` otherwise, and with
    /// `NotFound` if the session does not exist.
    async fn update(&self, session: &Session, expected_version: u64) -> Result<(), StoreError>;

    /// Sessions owned by `user_id`, newest `created_at` first, skipping
    /// `offset` and returning at most `limit`, plus the total count.
    async fn list_by_user(
        &self,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<UserSessions, StoreError>;
}

/// A window of a user's sessions.
#[derive(Debug, Clone, Default)]
pub struct UserSessions {
    /// Sessions in the requested window.
    pub sessions: Vec<Session>,
    /// Total number of sessions the user owns.
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Evaluator trait
// ---------------------------------------------------------------------------

/// An external component that scores a transcribed answer.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Human-readable evaluator name (e.g. "http").
    fn name(&self) -> &str;

    /// Score `transcript` against `target_word` in the given mode.
    async fn evaluate(&self, request: &EvaluationRequest) -> anyhow::Result<Evaluation>;
}

/// Input to an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub target_word: String,
    pub transcript: String,
    pub mode: Mode,
}

/// Scores produced by an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Pronunciation score in `[0, 100]`.
    pub pronunciation_score: f64,
    /// Spelling score in `[0, 100]`.
    pub spelling_score: f64,
    /// Human-readable feedback.
    #[serde(default)]
    pub feedback: String,
    /// Whether the answer counts as correct.
    pub is_correct: bool,
}
