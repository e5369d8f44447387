//! End-to-end tests of the REST surface on an ephemeral port.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use vocabquiz_core::{EngineConfig, HistoryConfig, HistoryQuery, MemoryStore, SessionEngine};
use vocabquiz_providers::MockEvaluator;
use vocabquiz_server::{build_router, serve, AppState, RouterOptions};

async fn spawn_server(with_evaluator: bool) -> String {
    let store = Arc::new(MemoryStore::new());
    let mut engine = SessionEngine::new(store.clone(), EngineConfig::default());
    if with_evaluator {
        engine = engine.with_evaluator(Arc::new(MockEvaluator::new()));
    }
    let history = HistoryQuery::new(store, HistoryConfig::default());
    let router = build_router(AppState::new(engine, history), &RouterOptions::default()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, router));
    format!("http://{addr}")
}

async fn create(client: &reqwest::Client, base: &str, user: &str, words: &[&str]) -> String {
    let body: Value = client
        .post(format!("{base}/api/quiz/create"))
        .json(&json!({ "userId": user, "words": words, "mode": "pronounce" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    body["quiz"]["sessionId"].as_str().unwrap().to_string()
}

async fn attempt(
    client: &reqwest::Client,
    base: &str,
    session_id: &str,
    p: f64,
    s: f64,
    correct: bool,
) -> (u16, Value) {
    let response = client
        .post(format!("{base}/api/quiz/{session_id}/attempt"))
        .json(&json!({
            "transcript": "answer",
            "pronunciationScore": p,
            "spellingScore": s,
            "feedback": "ok",
            "isCorrect": correct
        }))
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn health_is_served_outside_the_prefix() {
    let base = spawn_server(false).await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());

    let response = client.get(format!("{base}/api/health")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn full_session_over_http() {
    let base = spawn_server(false).await;
    let client = reqwest::Client::new();

    let response: Value = client
        .post(format!("{base}/api/quiz/create"))
        .json(&json!({ "userId": "u1", "words": ["cat", "dog"] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let quiz = &response["quiz"];
    assert_eq!(quiz["totalWords"], 2);
    assert_eq!(quiz["currentWordIndex"], 0);
    assert_eq!(quiz["currentWord"], "cat");
    assert_eq!(quiz["mode"], "pronounce");
    let id = quiz["sessionId"].as_str().unwrap().to_string();

    let (status, body) = attempt(&client, &base, &id, 90.0, 80.0, true).await;
    assert_eq!(status, 200);
    let result = &body["result"];
    assert_eq!(result["nextAction"], "next_word");
    assert_eq!(result["nextWord"], "dog");
    assert_eq!(result["progress"], 50);
    assert_eq!(result["scores"]["pronunciationScore"], 90.0);

    let (_, body) = attempt(&client, &base, &id, 60.0, 40.0, false).await;
    assert_eq!(body["result"]["nextAction"], "retry");
    assert_eq!(body["result"]["attemptsLeft"], 2);
    assert_eq!(body["result"]["progress"], 50);

    let (_, body) = attempt(&client, &base, &id, 40.0, 40.0, false).await;
    assert_eq!(body["result"]["attemptsLeft"], 1);

    let (_, body) = attempt(&client, &base, &id, 50.0, 60.0, false).await;
    assert_eq!(body["result"]["nextAction"], "quiz_completed");
    assert_eq!(body["result"]["progress"], 100);
    assert_eq!(body["result"]["attemptsLeft"], 0);

    let progress: Value = client
        .get(format!("{base}/api/quiz/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["quiz"]["status"], "completed");
    assert_eq!(progress["quiz"]["progress"], 100);
    assert_eq!(progress["quiz"]["completedWords"], 2);

    let results: Value = client
        .get(format!("{base}/api/quiz/{id}/results"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let results = &results["results"];
    assert_eq!(results["overallScore"], 70);
    assert_eq!(results["correctWords"], 1);
    assert_eq!(results["wordDetails"][0]["finalScore"], 85.0);
    assert_eq!(results["wordDetails"][1]["finalScore"], 55.0);
    assert_eq!(results["wordDetails"][1]["attemptCount"], 3);
    assert_eq!(results["wordDetails"][1]["bestAttempt"]["spellingScore"], 60.0);

    let (status, body) = attempt(&client, &base, &id, 100.0, 100.0, true).await;
    assert_eq!(status, 409);
    assert_eq!(body["kind"], "conflict");
}

#[tokio::test]
async fn bad_input_maps_to_error_statuses() {
    let base = spawn_server(false).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/quiz/create"))
        .json(&json!({ "userId": "u1", "words": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "invalid_argument");

    let response = client
        .post(format!("{base}/api/quiz/create"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "invalid_argument");

    let response = client
        .get(format!("{base}/api/quiz/no-such-session"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "not_found");

    let id = create(&client, &base, "u1", &["cat"]).await;
    let response = client
        .post(format!("{base}/api/quiz/{id}/attempt"))
        .json(&json!({ "transcript": "cat", "isCorrect": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn history_and_stats() {
    let base = spawn_server(false).await;
    let client = reqwest::Client::new();

    let first = create(&client, &base, "u1", &["cat"]).await;
    create(&client, &base, "u1", &["dog", "owl"]).await;
    create(&client, &base, "u1", &["emu"]).await;
    create(&client, &base, "u2", &["yak"]).await;
    attempt(&client, &base, &first, 80.0, 60.0, true).await;

    let body: Value = client
        .get(format!("{base}/api/quiz/user/u1/history?page=1&limit=2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["history"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["pagination"],
        json!({ "page": 1, "limit": 2, "total": 3, "pages": 2 })
    );

    let response = client
        .get(format!("{base}/api/quiz/user/u1/history?limit=500"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .get(format!("{base}/api/quiz/user/u1/history?page=abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let body: Value = client
        .get(format!("{base}/api/quiz/user/nobody/history"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["history"], json!([]));
    assert_eq!(body["pagination"]["total"], 0);

    let body: Value = client
        .get(format!("{base}/api/quiz/user/u1/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let stats = &body["stats"];
    assert_eq!(stats["totalQuizzes"], 3);
    assert_eq!(stats["completedQuizzes"], 1);
    assert_eq!(stats["totalWords"], 4);
    assert_eq!(stats["averageScore"], 70);
}

#[tokio::test]
async fn answer_uses_the_configured_evaluator() {
    let base = spawn_server(true).await;
    let client = reqwest::Client::new();
    let id = create(&client, &base, "u1", &["cat", "dog"]).await;

    let body: Value = client
        .post(format!("{base}/api/quiz/{id}/answer"))
        .json(&json!({ "transcript": "Cat" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["result"]["isCorrect"], true);
    assert_eq!(body["result"]["nextWord"], "dog");

    let response = client
        .post(format!("{base}/api/quiz/{id}/answer"))
        .json(&json!({ "transcript": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn answer_without_evaluator_is_unavailable() {
    let base = spawn_server(false).await;
    let client = reqwest::Client::new();
    let id = create(&client, &base, "u1", &["cat"]).await;

    let response = client
        .post(format!("{base}/api/quiz/{id}/answer"))
        .json(&json!({ "transcript": "cat" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 503);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "unavailable");
}

#[test]
fn invalid_cors_origin_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let engine = SessionEngine::new(store.clone(), EngineConfig::default());
    let history = HistoryQuery::new(store, HistoryConfig::default());
    let options = RouterOptions {
        api_prefix: "/api".into(),
        cors_origin: Some("http://bad\norigin".into()),
    };
    assert!(build_router(AppState::new(engine, history), &options).is_err());
}
