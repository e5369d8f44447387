//! Mock evaluator for testing and local demos.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use vocabquiz_core::traits::{Evaluation, EvaluationRequest, Evaluator};

/// An evaluator that needs no external service.
///
/// A transcript matching the target word (ignoring case and surrounding
/// whitespace) scores 100/100 and is correct; anything else gets the
/// configured miss scores.
pub struct MockEvaluator {
    miss_pronunciation: f64,
    miss_spelling: f64,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<EvaluationRequest>>,
}

impl MockEvaluator {
    pub fn new() -> Self {
        Self::with_miss_scores(40.0, 30.0)
    }

    /// Create a mock that scores mismatches with the given values.
    pub fn with_miss_scores(pronunciation: f64, spelling: f64) -> Self {
        Self {
            miss_pronunciation: pronunciation,
            miss_spelling: spelling,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this evaluator.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this evaluator.
    pub fn last_request(&self) -> Option<EvaluationRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

impl Default for MockEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Evaluator for MockEvaluator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn evaluate(&self, request: &EvaluationRequest) -> anyhow::Result<Evaluation> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        let matches = request
            .transcript
            .trim()
            .eq_ignore_ascii_case(request.target_word.trim());

        Ok(if matches {
            Evaluation {
                pronunciation_score: 100.0,
                spelling_score: 100.0,
                feedback: "Excellent! Perfect match.".into(),
                is_correct: true,
            }
        } else {
            Evaluation {
                pronunciation_score: self.miss_pronunciation,
                spelling_score: self.miss_spelling,
                feedback: format!("Expected \"{}\". Try again.", request.target_word),
                is_correct: false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocabquiz_core::model::Mode;

    fn request(target: &str, transcript: &str) -> EvaluationRequest {
        EvaluationRequest {
            target_word: target.into(),
            transcript: transcript.into(),
            mode: Mode::Spell,
        }
    }

    #[tokio::test]
    async fn exact_match_is_correct() {
        let evaluator = MockEvaluator::new();
        let evaluation = evaluator.evaluate(&request("Cat", " cat ")).await.unwrap();
        assert!(evaluation.is_correct);
        assert_eq!(evaluation.pronunciation_score, 100.0);
        assert_eq!(evaluator.call_count(), 1);
    }

    #[tokio::test]
    async fn mismatch_uses_miss_scores() {
        let evaluator = MockEvaluator::with_miss_scores(12.0, 34.0);
        let evaluation = evaluator.evaluate(&request("cat", "cap")).await.unwrap();
        assert!(!evaluation.is_correct);
        assert_eq!(evaluation.pronunciation_score, 12.0);
        assert_eq!(evaluation.spelling_score, 34.0);
        assert!(evaluation.feedback.contains("cat"));
        assert_eq!(evaluator.last_request().unwrap().transcript, "cap");
    }
}
