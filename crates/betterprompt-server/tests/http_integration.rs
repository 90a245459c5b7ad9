//! End-to-end tests against a real listening server.
//!
//! The app is spawned on 127.0.0.1:0 with in-memory SQLite. Optimizer tests
//! point the real OpenRouter client at a stub upstream, so the whole
//! request → failover → response path runs over HTTP.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use betterprompt_optimizer::mock::MockCompletion;
use betterprompt_optimizer::{Credentials, OpenRouterClient, Optimizer};
use betterprompt_server::auth::IdentityConfig;
use betterprompt_server::routes::{build_router, InnerAppState};
use betterprompt_server::test_helpers::{issue_key, spawn_test_server, test_state};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Completion endpoint that rate-limits `rate-limited-key` and answers everyone else.
async fn stub_upstream() -> String {
    async fn chat(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if auth == "Bearer rate-limited-key" {
            return (StatusCode::TOO_MANY_REQUESTS, Json(json!({ "error": "slow down" })));
        }
        let user = body["messages"][1]["content"].as_str().unwrap_or_default();
        (
            StatusCode::OK,
            Json(json!({
                "choices": [{ "message": { "content": format!("  Optimized: {user}  ") } }],
                "usage": { "prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19 }
            })),
        )
    }
    serve(Router::new().route("/chat/completions", post(chat))).await
}

async fn app_over(upstream: &str, primary: Option<&str>, secondary: Option<&str>) -> String {
    let state = test_state(MockCompletion::new(), false, false);
    let client = OpenRouterClient::new(upstream, "http://localhost:3000");
    let optimizer = Optimizer::new(Arc::new(client), Credentials::from_raw(primary, secondary))
        .with_deadline(Duration::from_secs(5));
    let state = Arc::new(InnerAppState {
        db: state.db.clone(),
        identity: IdentityConfig::new(state.db.clone(), None, "nobody"),
        optimizer,
    });
    serve(build_router(state)).await
}

#[tokio::test]
async fn health_check_via_http() {
    let server = spawn_test_server(MockCompletion::new(), false, false).await;
    let body: Value = reqwest::get(format!("{}/api/health", server.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn optimize_fails_over_to_secondary_key() {
    let upstream = stub_upstream().await;
    let base = app_over(&upstream, Some("rate-limited-key"), Some("good-key")).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/optimize"))
        .json(&json!({ "prompt": "summarise this", "tone": "casual" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["optimizedPrompt"], "Optimized: summarise this");
    assert_eq!(body["creditSource"], "secondary");
    assert_eq!(body["usage"]["total_tokens"], 19);
}

#[tokio::test]
async fn optimize_surfaces_rate_limit_without_secondary() {
    let upstream = stub_upstream().await;
    let base = app_over(&upstream, Some("rate-limited-key"), None).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/optimize"))
        .json(&json!({ "prompt": "summarise this" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 429);
    let body: Value = resp.json().await.unwrap();
    assert!(!body["error"].as_str().unwrap().contains("rate-limited-key"));
}

#[tokio::test]
async fn optimize_falls_back_when_upstream_is_down() {
    // Nothing listens on this port once the listener is dropped.
    let dead = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let base = app_over(&dead, Some("k1"), None).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/optimize"))
        .json(&json!({ "prompt": "hi", "fallback": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["creditSource"], "local");
    assert!(body["optimizedPrompt"]
        .as_str()
        .unwrap()
        .starts_with("Please help me with the following: hi"));
    assert!(body["warning"].as_str().unwrap().starts_with("Using local optimization"));
}

#[tokio::test]
async fn saved_prompts_are_scoped_to_the_token_owner() {
    let server = spawn_test_server(MockCompletion::new(), false, false).await;
    let alice = issue_key(&server.state, "alice").await;
    let bob = issue_key(&server.state, "bob").await;
    let http = reqwest::Client::new();
    let url = format!("{}/api/prompts", server.base_url);

    let resp = http.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    let created: Value = http
        .post(&url)
        .bearer_auth(&alice)
        .json(&json!({
            "title": "Release notes",
            "originalPrompt": "write release notes",
            "optimizedPrompt": "Write concise release notes for v2.",
            "model": "mistralai/mistral-7b-instruct:free",
            "tone": "friendly",
            "type": "content writing",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["prompt"]["id"].as_str().unwrap();

    let alice_list: Value = http
        .get(&url)
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(alice_list["prompts"].as_array().unwrap().len(), 1);
    let bob_list: Value = http
        .get(&url)
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(bob_list["prompts"].as_array().unwrap().is_empty());

    let resp = http
        .delete(format!("{url}/{id}"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = http
        .delete(format!("{url}/{id}"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}
