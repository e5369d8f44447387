//! Error types for the quiz engine and its session stores.
//!
//! `QuizError` is what callers of the engine see. `StoreError` is what a
//! `SessionStore` adapter reports; the engine classifies it (retry on a
//! version mismatch, surface everything else) without string matching.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, machine-readable classification of a [`QuizError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
    Unavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the session engine and history queries.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Missing or malformed input, or an exhausted attempt budget.
    #[error("{0}")]
    InvalidArgument(String),

    /// Unknown session.
    #[error("{0}")]
    NotFound(String),

    /// Lost a concurrent update race, or the session is already completed.
    #[error("{0}")]
    Conflict(String),

    /// The backing store or a collaborator could not be reached.
    #[error("{0}")]
    Unavailable(String),
}

impl QuizError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            QuizError::NotFound(_) => ErrorKind::NotFound,
            QuizError::Conflict(_) => ErrorKind::Conflict,
            QuizError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub(crate) fn session_not_found(session_id: &str) -> Self {
        QuizError::NotFound(format!("quiz session not found: {session_id}"))
    }
}

/// Errors reported by `SessionStore` implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No session with this id.
    #[error("session not found: {0}")]
    NotFound(String),

    /// A session with this id already exists.
    #[error("session already exists: {0}")]
    AlreadyExists(String),

    /// The stored version moved since the session was read.
    #[error("version mismatch for session {session_id}: expected {expected}, found {actual}")]
    VersionMismatch {
        session_id: String,
        expected: u64,
        actual: u64,
    },

    /// The store could not be reached or failed an I/O operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns `true` if re-running the whole transition may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::VersionMismatch { .. })
    }
}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => QuizError::session_not_found(&id),
            StoreError::AlreadyExists(_) | StoreError::VersionMismatch { .. } => {
                QuizError::Conflict(err.to_string())
            }
            StoreError::Unavailable(_) | StoreError::Serialization(_) => {
                QuizError::Unavailable(err.to_string())
            }
        }
    }
}
