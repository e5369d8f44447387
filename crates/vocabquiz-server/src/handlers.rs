//! Route handlers.
//!
//! Each handler parses its input, calls the engine or history query, and
//! wraps the projection in a `{success: true, <key>: ...}` envelope.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use vocabquiz_core::model::SessionId;
use vocabquiz_core::request::{
    AnswerRequest, AttemptSubmission, CreateSessionRequest, HistoryParams,
};
use vocabquiz_core::QuizError;

use crate::error::ApiError;
use crate::AppState;

type ApiResult = Result<Json<Value>, ApiError>;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now(),
    }))
}

pub async fn create_quiz(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    let created = state.engine.create_session(request).await?;
    Ok(Json(json!({ "success": true, "quiz": created })))
}

pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult {
    let progress = state.engine.progress(&SessionId::from(session_id)).await?;
    Ok(Json(json!({ "success": true, "quiz": progress })))
}

pub async fn submit_attempt(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    body: Result<Json<AttemptSubmission>, JsonRejection>,
) -> ApiResult {
    let Json(submission) = body?;
    let outcome = state
        .engine
        .submit_attempt(&SessionId::from(session_id), submission)
        .await?;
    Ok(Json(json!({ "success": true, "result": outcome })))
}

pub async fn answer(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    body: Result<Json<AnswerRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    let outcome = state
        .engine
        .answer(&SessionId::from(session_id), request)
        .await?;
    Ok(Json(json!({ "success": true, "result": outcome })))
}

pub async fn get_results(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult {
    let results = state.engine.results(&SessionId::from(session_id)).await?;
    Ok(Json(json!({ "success": true, "results": results })))
}

pub async fn user_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = params?;
    let page = state.history.history(&user_id, params).await?;
    Ok(Json(json!({
        "success": true,
        "history": page.history,
        "pagination": page.pagination,
    })))
}

pub async fn user_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult {
    let stats = state.history.user_stats(&user_id).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

pub async fn not_found() -> ApiError {
    ApiError(QuizError::NotFound("route not found".into()))
}
