//! HTTP evaluation provider client.
//!
//! Calls an external speech-evaluation service:
//! `POST {base_url}/evaluate` with `{targetWord, transcript, mode}`, expecting
//! `{success, evaluation: {pronunciationScore, spellingScore, feedback, isCorrect}}`.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use vocabquiz_core::model::Mode;
use vocabquiz_core::traits::{Evaluation, EvaluationRequest, Evaluator};

use crate::error::EvaluatorError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Evaluator backed by a remote HTTP service.
pub struct HttpEvaluator {
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpEvaluator {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateBody<'a> {
    target_word: &'a str,
    transcript: &'a str,
    mode: Mode,
}

#[derive(Deserialize)]
struct EvaluateResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    evaluation: Option<Evaluation>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl Evaluator for HttpEvaluator {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, request), fields(target_word = %request.target_word, mode = %request.mode))]
    async fn evaluate(&self, request: &EvaluationRequest) -> anyhow::Result<Evaluation> {
        let body = EvaluateBody {
            target_word: &request.target_word,
            transcript: &request.transcript,
            mode: request.mode,
        };

        let mut builder = self
            .client
            .post(format!("{}/evaluate", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                EvaluatorError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                EvaluatorError::NetworkError(format!(
                    "evaluation service not reachable at {}",
                    self.base_url
                ))
            } else {
                EvaluatorError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(EvaluatorError::AuthenticationFailed(body).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(EvaluatorError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let parsed: EvaluateResponse =
            response.json().await.map_err(|e| EvaluatorError::ApiError {
                status,
                message: format!("failed to parse response: {e}"),
            })?;

        match (parsed.success, parsed.evaluation) {
            (true, Some(evaluation)) => Ok(evaluation),
            (_, _) => Err(EvaluatorError::Rejected(
                parsed
                    .error
                    .unwrap_or_else(|| "no evaluation in response".to_string()),
            )
            .into()),
        }
    }
}
