//! Request payloads and their validation.
//!
//! Each operation has a loose, all-optional payload type as it arrives from a
//! caller, and a `validate` step that checks every field and produces the
//! typed input the engine works on. Nothing is mutated before validation
//! succeeds.

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{Attempt, Mode};

/// Default page size for history listings.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
/// Upper bound on the page size for history listings.
pub const MAX_HISTORY_LIMIT: usize = 100;

fn invalid(msg: impl Into<String>) -> QuizError {
    QuizError::InvalidArgument(msg.into())
}

// ---------------------------------------------------------------------------
// Session creation
// ---------------------------------------------------------------------------

/// Payload for creating a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub words: Option<Vec<String>>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// A validated session creation input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub user_id: String,
    pub words: Vec<String>,
    pub mode: Mode,
}

impl CreateSessionRequest {
    pub fn new(user_id: impl Into<String>, words: Vec<String>, mode: Option<Mode>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            words: Some(words),
            mode: mode.map(|m| m.to_string()),
        }
    }

    pub fn validate(self) -> Result<NewSession, QuizError> {
        let user_id = self
            .user_id
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| invalid("user ID and words array are required"))?;

        let words = self
            .words
            .filter(|w| !w.is_empty())
            .ok_or_else(|| invalid("user ID and words array are required"))?;
        if let Some(pos) = words.iter().position(|w| w.trim().is_empty()) {
            return Err(invalid(format!("word at position {pos} is blank")));
        }

        let mode = match self.mode {
            Some(m) => m.parse::<Mode>().map_err(invalid)?,
            None => Mode::default(),
        };

        Ok(NewSession {
            user_id,
            words,
            mode,
        })
    }
}

// ---------------------------------------------------------------------------
// Attempt submission
// ---------------------------------------------------------------------------

/// Payload for submitting a scored attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSubmission {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub pronunciation_score: Option<f64>,
    #[serde(default)]
    pub spelling_score: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub is_correct: Option<bool>,
    /// When set, the attempt only applies if this is still the current word.
    #[serde(default)]
    pub word_index: Option<usize>,
}

/// A validated attempt, optionally pinned to a word index.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAttempt {
    pub attempt: Attempt,
    pub word_index: Option<usize>,
}

impl AttemptSubmission {
    pub fn validate(self) -> Result<ValidatedAttempt, QuizError> {
        let transcript = self
            .transcript
            .ok_or_else(|| invalid("transcript is required"))?;
        let pronunciation_score = self
            .pronunciation_score
            .ok_or_else(|| invalid("pronunciationScore is required"))?;
        let spelling_score = self
            .spelling_score
            .ok_or_else(|| invalid("spellingScore is required"))?;
        if !pronunciation_score.is_finite() || !spelling_score.is_finite() {
            return Err(invalid("scores must be finite numbers"));
        }
        let is_correct = self
            .is_correct
            .ok_or_else(|| invalid("isCorrect is required"))?;

        Ok(ValidatedAttempt {
            attempt: Attempt {
                transcript,
                pronunciation_score,
                spelling_score,
                feedback: self.feedback.unwrap_or_default(),
                is_correct,
            },
            word_index: self.word_index,
        })
    }
}

impl From<Attempt> for AttemptSubmission {
    fn from(a: Attempt) -> Self {
        Self {
            transcript: Some(a.transcript),
            pronunciation_score: Some(a.pronunciation_score),
            spelling_score: Some(a.spelling_score),
            feedback: Some(a.feedback),
            is_correct: Some(a.is_correct),
            word_index: None,
        }
    }
}

/// Payload for evaluate-and-submit: just the learner's transcript.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    #[serde(default)]
    pub transcript: Option<String>,
}

impl AnswerRequest {
    pub fn validate(self) -> Result<String, QuizError> {
        self.transcript
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| invalid("transcript is required"))
    }
}

// ---------------------------------------------------------------------------
// History paging
// ---------------------------------------------------------------------------

/// Query parameters for history listings. 1-based page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// A validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub limit: usize,
}

impl PageWindow {
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl HistoryParams {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn validate(self, default_limit: usize, max_limit: usize) -> Result<PageWindow, QuizError> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(invalid("page must be at least 1"));
        }
        let limit = self.limit.unwrap_or(default_limit);
        if limit == 0 {
            return Err(invalid("limit must be at least 1"));
        }
        if limit > max_limit {
            return Err(invalid(format!("limit must be at most {max_limit}")));
        }
        Ok(PageWindow { page, limit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn create_defaults_mode_to_pronounce() {
        let req: CreateSessionRequest =
            serde_json::from_str(r#"{"userId":"u1","words":["cat","dog"]}"#).unwrap();
        let new = req.validate().unwrap();
        assert_eq!(new.mode, Mode::Pronounce);
        assert_eq!(new.words, vec!["cat", "dog"]);
        assert_eq!(new.user_id, "u1");
    }

    #[test]
    fn create_rejects_bad_mode() {
        let req: CreateSessionRequest =
            serde_json::from_str(r#"{"userId":"u1","words":["cat"],"mode":"sing"}"#).unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("sing"));
    }

    #[test]
    fn create_rejects_missing_or_empty_words() {
        let missing = CreateSessionRequest {
            user_id: Some("u1".into()),
            ..Default::default()
        };
        assert!(missing.validate().is_err());

        let empty = CreateSessionRequest::new("u1", vec![], None);
        assert_eq!(
            empty.validate().unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );

        let blank = CreateSessionRequest::new("u1", vec!["cat".into(), "  ".into()], None);
        assert!(blank.validate().unwrap_err().to_string().contains("position 1"));
    }

    #[test]
    fn create_rejects_missing_user() {
        let req = CreateSessionRequest {
            user_id: None,
            words: Some(vec!["cat".into()]),
            mode: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn attempt_requires_scores_and_correctness() {
        let req: AttemptSubmission =
            serde_json::from_str(r#"{"transcript":"cat","pronunciationScore":90}"#).unwrap();
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("spellingScore"));

        let req: AttemptSubmission = serde_json::from_str(
            r#"{"transcript":"cat","pronunciationScore":90,"spellingScore":80,"isCorrect":true}"#,
        )
        .unwrap();
        let v = req.validate().unwrap();
        assert_eq!(v.attempt.feedback, "");
        assert!(v.attempt.is_correct);
        assert_eq!(v.word_index, None);
    }

    #[test]
    fn attempt_keeps_out_of_range_scores() {
        let req = AttemptSubmission {
            transcript: Some("x".into()),
            pronunciation_score: Some(150.0),
            spelling_score: Some(-5.0),
            feedback: None,
            is_correct: Some(false),
            word_index: Some(2),
        };
        let v = req.validate().unwrap();
        assert_eq!(v.attempt.pronunciation_score, 150.0);
        assert_eq!(v.attempt.spelling_score, -5.0);
        assert_eq!(v.word_index, Some(2));
    }

    #[test]
    fn answer_requires_non_blank_transcript() {
        assert!(AnswerRequest { transcript: None }.validate().is_err());
        assert!(AnswerRequest {
            transcript: Some(" ".into())
        }
        .validate()
        .is_err());
        assert_eq!(
            AnswerRequest {
                transcript: Some("cat".into())
            }
            .validate()
            .unwrap(),
            "cat"
        );
    }

    #[test]
    fn history_params_defaults_and_bounds() {
        let w = HistoryParams::default().validate(10, 100).unwrap();
        assert_eq!(w, PageWindow { page: 1, limit: 10 });
        assert_eq!(w.offset(), 0);

        let w = HistoryParams::new(3, 5).validate(10, 100).unwrap();
        assert_eq!(w.offset(), 10);

        assert!(HistoryParams::new(0, 5).validate(10, 100).is_err());
        assert!(HistoryParams::new(1, 0).validate(10, 100).is_err());
        assert!(HistoryParams::new(1, 101).validate(10, 100).is_err());
    }
}
