//! Quiz session engine.
//!
//! Owns the session state machine: creation, attempt submission with
//! retry / advance / completion transitions, evaluate-and-submit, and the
//! read projections. Every write goes through the store's conditional update;
//! a lost race re-runs the whole transition against a fresh read.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::error::QuizError;
use crate::model::{Attempt, Session, SessionId};
use crate::request::{AnswerRequest, AttemptSubmission, CreateSessionRequest};
use crate::scoring;
use crate::traits::{EvaluationRequest, Evaluator, SessionStore};
use crate::views::{
    AttemptOutcome, AttemptScores, NextAction, ProgressView, ResultsView, SessionCreated,
};

/// Upper bound on the backoff between conditional-update retries.
const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Configuration for the session engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Re-runs of a transition after losing a version race.
    pub max_update_retries: u32,
    /// Delay before the first re-run; doubles on each further one.
    pub retry_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_update_retries: 3,
            retry_delay: Duration::from_millis(10),
        }
    }
}

impl Session {
    /// Apply one attempt to the current word and move the state machine.
    ///
    /// This is the only mutation path of a session. When `expected_index` is
    /// set the attempt is refused unless it still targets the current word.
    pub(crate) fn apply_attempt(
        &mut self,
        attempt: Attempt,
        expected_index: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<AttemptOutcome, QuizError> {
        if self.is_completed() {
            return Err(QuizError::Conflict(format!(
                "quiz session {} is already completed",
                self.session_id()
            )));
        }
        let answered = self.current_word_index();
        if let Some(index) = expected_index {
            if index != answered {
                return Err(QuizError::Conflict(format!(
                    "attempt targets word {index} but the current word is {answered}"
                )));
            }
        }

        let total = self.total_words();
        let scores = AttemptScores {
            pronunciation_score: attempt.pronunciation_score,
            spelling_score: attempt.spelling_score,
        };
        let is_correct = attempt.is_correct;
        let feedback = attempt.feedback.clone();

        let slot = self.current_slot_mut()?;
        let word_completed = slot.record(attempt)?;
        let attempts_left = slot.attempts_left();

        let (next_action, next_word) = if !word_completed {
            (NextAction::Retry, None)
        } else if answered + 1 < total {
            self.advance();
            (
                NextAction::NextWord,
                Some(self.words()[self.current_word_index()].clone()),
            )
        } else {
            let overall = scoring::overall_score(self.word_results());
            self.complete(overall, now);
            (NextAction::QuizCompleted, None)
        };
        self.touch(now);

        Ok(AttemptOutcome {
            is_correct,
            feedback,
            scores,
            next_action,
            next_word,
            progress: scoring::percent(answered + usize::from(word_completed), total),
            attempts_left,
        })
    }
}

/// The quiz session engine.
pub struct SessionEngine {
    store: Arc<dyn SessionStore>,
    evaluator: Option<Arc<dyn Evaluator>>,
    config: EngineConfig,
}

impl SessionEngine {
    pub fn new(store: Arc<dyn SessionStore>, config: EngineConfig) -> Self {
        Self {
            store,
            evaluator: None,
            config,
        }
    }

    /// Attach the evaluation provider used by [`SessionEngine::answer`].
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create and persist a new session.
    pub async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<SessionCreated, QuizError> {
        let new = request.validate()?;
        let session = Session::new(
            SessionId::generate(),
            new.user_id,
            new.words,
            new.mode,
            Utc::now(),
        )?;
        self.store.create(&session).await?;

        info!(
            session_id = %session.session_id(),
            user_id = session.user_id(),
            words = session.total_words(),
            mode = %session.mode(),
            "quiz session created"
        );

        Ok(SessionCreated {
            session_id: session.session_id().clone(),
            total_words: session.total_words(),
            current_word_index: 0,
            current_word: session.words()[0].clone(),
            mode: session.mode(),
        })
    }

    /// Load a session, failing with `NotFound` if it does not exist.
    pub async fn session(&self, session_id: &SessionId) -> Result<Session, QuizError> {
        self.store
            .get(session_id)
            .await?
            .ok_or_else(|| QuizError::session_not_found(session_id.as_str()))
    }

    /// Submit a scored attempt for the current word.
    #[instrument(skip(self, submission), fields(session_id = %session_id))]
    pub async fn submit_attempt(
        &self,
        session_id: &SessionId,
        submission: AttemptSubmission,
    ) -> Result<AttemptOutcome, QuizError> {
        let validated = submission.validate()?;
        self.apply(session_id, validated.attempt, validated.word_index)
            .await
    }

    /// Evaluate a transcript for the current word and submit the result.
    #[instrument(skip(self, request), fields(session_id = %session_id))]
    pub async fn answer(
        &self,
        session_id: &SessionId,
        request: AnswerRequest,
    ) -> Result<AttemptOutcome, QuizError> {
        let transcript = request.validate()?;
        let evaluator = self.evaluator.as_ref().ok_or_else(|| {
            QuizError::Unavailable("no evaluation provider is configured".into())
        })?;

        let session = self.session(session_id).await?;
        let Some(target_word) = session.current_word() else {
            return Err(QuizError::Conflict(format!(
                "quiz session {session_id} is already completed"
            )));
        };
        let index = session.current_word_index();

        let evaluation = evaluator
            .evaluate(&EvaluationRequest {
                target_word: target_word.to_string(),
                transcript: transcript.clone(),
                mode: session.mode(),
            })
            .await
            .map_err(|e| {
                warn!(evaluator = evaluator.name(), "evaluation failed: {e:#}");
                QuizError::Unavailable(format!("evaluation provider failed: {e}"))
            })?;

        let attempt = Attempt {
            transcript,
            pronunciation_score: evaluation.pronunciation_score,
            spelling_score: evaluation.spelling_score,
            feedback: evaluation.feedback,
            is_correct: evaluation.is_correct,
        };
        self.apply(session_id, attempt, Some(index)).await
    }

    /// Progress of a session.
    pub async fn progress(&self, session_id: &SessionId) -> Result<ProgressView, QuizError> {
        Ok(ProgressView::from(&self.session(session_id).await?))
    }

    /// Results of a session. Valid before completion too.
    pub async fn results(&self, session_id: &SessionId) -> Result<ResultsView, QuizError> {
        Ok(ResultsView::from(&self.session(session_id).await?))
    }

    /// Read, transition, and conditionally write, re-running on version races.
    async fn apply(
        &self,
        session_id: &SessionId,
        attempt: Attempt,
        word_index: Option<usize>,
    ) -> Result<AttemptOutcome, QuizError> {
        let mut retry_delay = self.config.retry_delay;

        for retry in 0..=self.config.max_update_retries {
            if retry > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
            }

            let mut session = self.session(session_id).await?;
            let expected_version = session.version();
            let outcome = session.apply_attempt(attempt.clone(), word_index, Utc::now())?;

            match self.store.update(&session, expected_version).await {
                Ok(()) => {
                    debug!(
                        next_action = ?outcome.next_action,
                        progress = outcome.progress,
                        attempts_left = outcome.attempts_left,
                        "attempt recorded"
                    );
                    if let Some(score) = session.overall_score() {
                        info!(overall_score = score, "quiz session completed");
                    }
                    return Ok(outcome);
                }
                Err(e) if e.is_retryable() => {
                    warn!(retry, "conditional update lost a race: {e}");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(QuizError::Conflict(format!(
            "concurrent updates to quiz session {session_id}, please retry"
        )))
    }
}
