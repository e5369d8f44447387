//! Evaluation provider error types.

use thiserror::Error;

/// Errors that can occur when calling an evaluation provider.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// The provider rejected our credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The provider answered with an error status.
    #[error("evaluator error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The provider answered 2xx but reported `success: false` or no evaluation.
    #[error("evaluation rejected: {0}")]
    Rejected(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}
