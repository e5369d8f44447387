//! Word and session scoring.
//!
//! Pure functions over attempt histories and word results. A word's final
//! score is the best per-attempt average; a session's overall score is the
//! rounded mean of its word final scores, with unscored words counting as 0.

use crate::model::{Attempt, WordResult};

/// Round to the nearest integer, halves rounding up.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Best `(pronunciation + spelling) / 2` over the attempts, or `None` if
/// there are no attempts.
pub fn final_score(attempts: &[Attempt]) -> Option<f64> {
    attempts
        .iter()
        .map(Attempt::average)
        .fold(None, |best: Option<f64>, avg| match best {
            Some(b) if b >= avg => Some(b),
            _ => Some(avg),
        })
}

/// Rounded mean of the word final scores. Words without a final score count
/// as 0. Returns 0 for an empty slice.
pub fn overall_score(word_results: &[WordResult]) -> i64 {
    if word_results.is_empty() {
        return 0;
    }
    let sum: f64 = word_results
        .iter()
        .map(|w| w.final_score().unwrap_or(0.0))
        .sum();
    round_half_up(sum / word_results.len() as f64)
}

/// The attempt with the highest combined score. Ties go to the earliest one.
pub fn best_attempt(attempts: &[Attempt]) -> Option<&Attempt> {
    let mut iter = attempts.iter();
    let first = iter.next()?;
    Some(iter.fold(first, |best, current| {
        if current.combined() > best.combined() {
            current
        } else {
            best
        }
    }))
}

/// Percentage of `done` out of `total`, rounded half up. 0 when `total` is 0.
pub fn percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    round_half_up(100.0 * done as f64 / total as f64).clamp(0, 100) as u32
}

/// Rounded mean of a list of scores, 0 if empty.
pub fn mean_score(scores: &[i64]) -> i64 {
    if scores.is_empty() {
        return 0;
    }
    round_half_up(scores.iter().sum::<i64>() as f64 / scores.len() as f64)
}
