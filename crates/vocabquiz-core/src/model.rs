//! Core data model types for vocabquiz.
//!
//! A [`Session`] is the aggregate: one learner's run through an ordered word
//! list. Its fields are private; the only mutation path is the transition in
//! [`crate::engine`], which keeps the word slots, the current index and the
//! session state consistent with each other.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuizError;
use crate::scoring;

/// Maximum number of attempts allowed per word.
pub const MAX_ATTEMPTS: usize = 3;

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Allocate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What the learner practises for each word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Pronounce,
    Spell,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Pronounce => write!(f, "pronounce"),
            Mode::Spell => write!(f, "spell"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pronounce" => Ok(Mode::Pronounce),
            "spell" => Ok(Mode::Spell),
            other => Err(format!(
                "mode must be either \"pronounce\" or \"spell\", got \"{other}\""
            )),
        }
    }
}

/// One scored submission for a word. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub transcript: String,
    pub pronunciation_score: f64,
    pub spelling_score: f64,
    pub feedback: String,
    pub is_correct: bool,
}

impl Attempt {
    /// Mean of the two scores; the per-attempt value a final score is taken from.
    pub fn average(&self) -> f64 {
        (self.pronunciation_score + self.spelling_score) / 2.0
    }

    /// Sum of the two scores; used to pick the best attempt.
    pub fn combined(&self) -> f64 {
        self.pronunciation_score + self.spelling_score
    }
}

/// State of a single word slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WordSlotState {
    Pending,
    Completed { final_score: f64 },
}

/// Practice state for one word inside a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordResult {
    word: String,
    attempts: Vec<Attempt>,
    state: WordSlotState,
}

impl WordResult {
    pub(crate) fn new(word: String) -> Self {
        Self {
            word,
            attempts: Vec::new(),
            state: WordSlotState::Pending,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn state(&self) -> WordSlotState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, WordSlotState::Completed { .. })
    }

    pub fn final_score(&self) -> Option<f64> {
        match self.state {
            WordSlotState::Completed { final_score } => Some(final_score),
            WordSlotState::Pending => None,
        }
    }

    pub fn attempts_left(&self) -> u32 {
        MAX_ATTEMPTS.saturating_sub(self.attempts.len()) as u32
    }

    /// Whether any attempt on this word was marked correct.
    pub fn has_correct_attempt(&self) -> bool {
        self.attempts.iter().any(|a| a.is_correct)
    }

    /// Append an attempt and complete the slot when it is correct or the
    /// budget is spent. Returns `true` if this attempt completed the slot.
    pub(crate) fn record(&mut self, attempt: Attempt) -> Result<bool, QuizError> {
        if self.is_completed() {
            return Err(QuizError::InvalidArgument(format!(
                "word \"{}\" is already completed",
                self.word
            )));
        }
        if self.attempts.len() >= MAX_ATTEMPTS {
            return Err(QuizError::InvalidArgument(format!(
                "attempt budget exhausted for word \"{}\" ({MAX_ATTEMPTS} attempts)",
                self.word
            )));
        }

        let is_correct = attempt.is_correct;
        self.attempts.push(attempt);

        if is_correct || self.attempts.len() == MAX_ATTEMPTS {
            let final_score = scoring::final_score(&self.attempts).unwrap_or(0.0);
            self.state = WordSlotState::Completed { final_score };
            return Ok(true);
        }
        Ok(false)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Completed {
        overall_score: i64,
        completed_at: DateTime<Utc>,
    },
}

/// Coarse status label used in projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// One learner's run through an ordered word list in one mode.
///
/// Deserialization goes through [`SessionRecord`] and rejects records whose
/// slots, index and state disagree, so a loaded session is always safe to
/// transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord")]
pub struct Session {
    session_id: SessionId,
    user_id: String,
    words: Vec<String>,
    mode: Mode,
    current_word_index: usize,
    state: SessionState,
    word_results: Vec<WordResult>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

/// Unchecked wire shape of a [`Session`].
#[derive(Deserialize)]
struct SessionRecord {
    session_id: SessionId,
    user_id: String,
    words: Vec<String>,
    mode: Mode,
    current_word_index: usize,
    state: SessionState,
    word_results: Vec<WordResult>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    version: u64,
}

impl TryFrom<SessionRecord> for Session {
    type Error = String;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        let session = Session {
            session_id: record.session_id,
            user_id: record.user_id,
            words: record.words,
            mode: record.mode,
            current_word_index: record.current_word_index,
            state: record.state,
            word_results: record.word_results,
            created_at: record.created_at,
            updated_at: record.updated_at,
            version: record.version,
        };
        session.check_consistency()?;
        Ok(session)
    }
}

impl Session {
    /// Build a fresh active session with one pending slot per word.
    ///
    /// Fails with `InvalidArgument` if `words` is empty.
    pub fn new(
        session_id: SessionId,
        user_id: impl Into<String>,
        words: Vec<String>,
        mode: Mode,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        if words.is_empty() {
            return Err(QuizError::InvalidArgument(
                "words array must contain at least one word".into(),
            ));
        }
        let word_results = words.iter().cloned().map(WordResult::new).collect();
        Ok(Self {
            session_id,
            user_id: user_id.into(),
            words,
            mode,
            current_word_index: 0,
            state: SessionState::Active,
            word_results,
            created_at,
            updated_at: created_at,
            version: 0,
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn total_words(&self) -> usize {
        self.words.len()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn current_word_index(&self) -> usize {
        self.current_word_index
    }

    /// The word currently being practised, `None` once the session is completed.
    pub fn current_word(&self) -> Option<&str> {
        match self.state {
            SessionState::Active => self.words.get(self.current_word_index).map(String::as_str),
            SessionState::Completed { .. } => None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::Active => SessionStatus::Active,
            SessionState::Completed { .. } => SessionStatus::Completed,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, SessionState::Completed { .. })
    }

    pub fn overall_score(&self) -> Option<i64> {
        match self.state {
            SessionState::Completed { overall_score, .. } => Some(overall_score),
            SessionState::Active => None,
        }
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            SessionState::Completed { completed_at, .. } => Some(completed_at),
            SessionState::Active => None,
        }
    }

    pub fn word_results(&self) -> &[WordResult] {
        &self.word_results
    }

    pub fn completed_words(&self) -> usize {
        self.word_results.iter().filter(|w| w.is_completed()).count()
    }

    pub fn correct_words(&self) -> usize {
        self.word_results
            .iter()
            .filter(|w| w.has_correct_attempt())
            .count()
    }

    pub fn total_attempts(&self) -> usize {
        self.word_results.iter().map(|w| w.attempts.len()).sum()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Optimistic-concurrency counter, bumped by every transition.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn current_slot_mut(&mut self) -> Result<&mut WordResult, QuizError> {
        let index = self.current_word_index;
        let session_id = &self.session_id;
        self.word_results.get_mut(index).ok_or_else(|| {
            QuizError::Unavailable(format!(
                "session {session_id} has no word slot at index {index}"
            ))
        })
    }

    /// Check that slots, current index and state agree with each other.
    ///
    /// Slots before the current index are completed, the rest are pending,
    /// and a completed session sits on its last word with every slot done.
    fn check_consistency(&self) -> Result<(), String> {
        let id = &self.session_id;
        if self.words.is_empty() {
            return Err(format!("session {id} has no words"));
        }
        if self.word_results.len() != self.words.len() {
            return Err(format!(
                "session {id} has {} word slots for {} words",
                self.word_results.len(),
                self.words.len()
            ));
        }
        if self.current_word_index >= self.words.len() {
            return Err(format!(
                "session {id} current word index {} is out of range for {} words",
                self.current_word_index,
                self.words.len()
            ));
        }

        for (i, (slot, word)) in self.word_results.iter().zip(&self.words).enumerate() {
            if slot.word != *word {
                return Err(format!(
                    "session {id} slot {i} is for \"{}\" but the word is \"{word}\"",
                    slot.word
                ));
            }
            if slot.attempts.len() > MAX_ATTEMPTS {
                return Err(format!(
                    "session {id} slot {i} has {} attempts (max {MAX_ATTEMPTS})",
                    slot.attempts.len()
                ));
            }
            let pending_ok = slot.attempts.len() < MAX_ATTEMPTS && !slot.has_correct_attempt();
            if !slot.is_completed() && !pending_ok {
                return Err(format!("session {id} slot {i} should have been completed"));
            }
            if slot.is_completed() && slot.attempts.is_empty() {
                return Err(format!("session {id} slot {i} is completed without attempts"));
            }

            let expect_completed = match self.state {
                SessionState::Active => i < self.current_word_index,
                SessionState::Completed { .. } => true,
            };
            if slot.is_completed() != expect_completed {
                return Err(format!(
                    "session {id} slot {i} state does not match current word index {}",
                    self.current_word_index
                ));
            }
        }

        if self.is_completed() && self.current_word_index + 1 != self.words.len() {
            return Err(format!(
                "completed session {id} does not sit on its last word"
            ));
        }
        Ok(())
    }

    pub(crate) fn advance(&mut self) {
        if self.current_word_index + 1 < self.words.len() {
            self.current_word_index += 1;
        }
    }

    pub(crate) fn complete(&mut self, overall_score: i64, completed_at: DateTime<Utc>) {
        self.state = SessionState::Completed {
            overall_score,
            completed_at,
        };
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(p: f64, s: f64, correct: bool) -> Attempt {
        Attempt {
            transcript: "x".into(),
            pronunciation_score: p,
            spelling_score: s,
            feedback: String::new(),
            is_correct: correct,
        }
    }

    #[test]
    fn mode_display_and_parse() {
        assert_eq!(Mode::Pronounce.to_string(), "pronounce");
        assert_eq!(Mode::Spell.to_string(), "spell");
        assert_eq!("spell".parse::<Mode>().unwrap(), Mode::Spell);
        assert_eq!(Mode::default(), Mode::Pronounce);
        assert!("sing".parse::<Mode>().is_err());
    }

    #[test]
    fn new_session_has_one_pending_slot_per_word() {
        let words = vec!["cat".to_string(), "dog".to_string(), "owl".to_string()];
        let session =
            Session::new(SessionId::generate(), "u1", words.clone(), Mode::Spell, Utc::now())
                .unwrap();

        assert_eq!(session.word_results().len(), words.len());
        for (slot, word) in session.word_results().iter().zip(&words) {
            assert_eq!(slot.word(), word);
            assert!(slot.attempts().is_empty());
            assert_eq!(slot.state(), WordSlotState::Pending);
        }
        assert_eq!(session.current_word(), Some("cat"));
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.version(), 0);
        assert!(session.overall_score().is_none());
    }

    #[test]
    fn empty_word_list_rejected() {
        let err = Session::new(SessionId::generate(), "u1", vec![], Mode::Pronounce, Utc::now())
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }

    #[test]
    fn slot_completes_on_correct_attempt() {
        let mut slot = WordResult::new("cat".into());
        assert!(!slot.record(attempt(40.0, 50.0, false)).unwrap());
        assert!(slot.record(attempt(90.0, 80.0, true)).unwrap());
        assert_eq!(slot.final_score(), Some(85.0));
        assert_eq!(slot.attempts_left(), 1);
    }

    #[test]
    fn slot_completes_after_third_attempt_with_best_average() {
        let mut slot = WordResult::new("dog".into());
        slot.record(attempt(40.0, 40.0, false)).unwrap();
        slot.record(attempt(70.0, 50.0, false)).unwrap();
        assert!(!slot.is_completed());
        assert!(slot.record(attempt(30.0, 20.0, false)).unwrap());
        assert_eq!(slot.final_score(), Some(60.0));
        assert_eq!(slot.attempts_left(), 0);
    }

    #[test]
    fn completed_slot_rejects_further_attempts() {
        let mut slot = WordResult::new("owl".into());
        slot.record(attempt(100.0, 100.0, true)).unwrap();
        let err = slot.record(attempt(10.0, 10.0, false)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
        assert_eq!(slot.attempts().len(), 1);
        assert!(slot.is_completed());
    }

    #[test]
    fn session_serde_roundtrip_keeps_state() {
        let mut session = Session::new(
            SessionId::from("fixed"),
            "u1",
            vec!["cat".into()],
            Mode::Pronounce,
            Utc::now(),
        )
        .unwrap();
        session
            .current_slot_mut()
            .unwrap()
            .record(attempt(90.0, 80.0, true))
            .unwrap();
        session.complete(85, Utc::now());

        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
        assert_eq!(back.overall_score(), Some(85));
        assert!(back.current_word().is_none());
    }

    fn one_word_json() -> serde_json::Value {
        let session = Session::new(
            SessionId::from("s1"),
            "u1",
            vec!["cat".into()],
            Mode::Pronounce,
            Utc::now(),
        )
        .unwrap();
        serde_json::to_value(&session).unwrap()
    }

    #[test]
    fn session_with_out_of_range_index_is_rejected() {
        let mut value = one_word_json();
        value["current_word_index"] = serde_json::json!(4);
        let err = serde_json::from_value::<Session>(value).unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn session_with_mismatched_slots_is_rejected() {
        let mut value = one_word_json();
        value["words"] = serde_json::json!(["cat", "dog"]);
        assert!(serde_json::from_value::<Session>(value).is_err());

        let mut value = one_word_json();
        value["words"] = serde_json::json!([]);
        value["word_results"] = serde_json::json!([]);
        assert!(serde_json::from_value::<Session>(value).is_err());
    }

    #[test]
    fn active_session_on_completed_slot_is_rejected() {
        let mut session = Session::new(
            SessionId::from("s1"),
            "u1",
            vec!["cat".into(), "dog".into()],
            Mode::Pronounce,
            Utc::now(),
        )
        .unwrap();
        session
            .current_slot_mut()
            .unwrap()
            .record(attempt(90.0, 90.0, true))
            .unwrap();
        // Slot 0 completed but the index never advanced.
        let json = serde_json::to_string(&session).unwrap();
        let err = serde_json::from_str::<Session>(&json).unwrap_err();
        assert!(err.to_string().contains("slot 0"), "{err}");
    }

    #[test]
    fn slot_over_attempt_budget_is_rejected() {
        let mut session = Session::new(
            SessionId::from("s1"),
            "u1",
            vec!["cat".into()],
            Mode::Spell,
            Utc::now(),
        )
        .unwrap();
        session.word_results[0].attempts = vec![attempt(10.0, 10.0, false); 4];
        let json = serde_json::to_string(&session).unwrap();
        let err = serde_json::from_str::<Session>(&json).unwrap_err();
        assert!(err.to_string().contains("max 3"), "{err}");
    }
}
