use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use betterprompt_core::CreateSavedPrompt;
use betterprompt_db::DbError;
use serde_json::{json, Value};
use tracing::{error, info};

use super::{json_body, AppState};
use crate::auth::UserId;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/prompts", get(list_prompts).post(create_prompt))
        .route("/api/prompts/{id}", get(get_prompt).delete(delete_prompt))
}

async fn list_prompts(
    State(state): State<AppState>,
    Extension(UserId(user)): Extension<UserId>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .db
        .list_prompts(&user)
        .await
        .map(|prompts| Json(json!({ "prompts": prompts })))
        .map_err(to_error)
}

async fn create_prompt(
    State(state): State<AppState>,
    Extension(UserId(user)): Extension<UserId>,
    payload: Result<Json<CreateSavedPrompt>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let input = json_body(payload)?;
    let prompt = state.db.create_prompt(&user, &input).await.map_err(to_error)?;
    info!(prompt_id = %prompt.id, "saved prompt");
    Ok((StatusCode::CREATED, Json(json!({ "prompt": prompt }))))
}

async fn get_prompt(
    State(state): State<AppState>,
    Extension(UserId(user)): Extension<UserId>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .db
        .get_prompt(&id, &user)
        .await
        .map(|prompt| Json(json!({ "prompt": prompt })))
        .map_err(to_error)
}

async fn delete_prompt(
    State(state): State<AppState>,
    Extension(UserId(user)): Extension<UserId>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.db.delete_prompt(&id, &user).await.map_err(to_error)?;
    info!(prompt_id = %id, "deleted prompt");
    Ok(Json(json!({ "message": "Prompt deleted successfully" })))
}

fn to_error(e: DbError) -> (StatusCode, Json<Value>) {
    let (status, msg) = match &e {
        DbError::NotFound(_) => (StatusCode::NOT_FOUND, "Prompt not found".to_string()),
        DbError::InvalidInput(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        DbError::Internal(_) | DbError::Io(_) => {
            error!("prompt storage failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {e}"))
        }
    };
    (status, Json(json!({ "error": msg })))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use std::sync::Arc;

    use betterprompt_optimizer::mock::MockCompletion;
    use betterprompt_optimizer::{Credentials, Optimizer};

    use crate::auth::IdentityConfig;
    use crate::routes::{build_router, InnerAppState};
    use crate::test_helpers::{issue_key, test_router_with_auth, test_state, UnavailableDatabase};

    async fn send(
        app: &axum::Router,
        method: &str,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"));
        let req = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn sample() -> Value {
        json!({
            "title": "Cover letter",
            "originalPrompt": "write a cover letter",
            "optimizedPrompt": "Write a one-page cover letter for a backend role.",
            "model": "deepseek/deepseek-r1-distill-llama-70b:free",
            "tone": "professional",
            "type": "content writing",
        })
    }

    #[tokio::test]
    async fn prompt_crud_over_http() {
        let (app, token) = test_router_with_auth().await;

        let (status, body) = send(&app, "GET", "/api/prompts", &token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prompts"], json!([]));

        let (status, body) = send(&app, "POST", "/api/prompts", &token, Some(sample())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["prompt"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["prompt"]["type"], "content writing");
        assert_eq!(body["prompt"]["originalPrompt"], "write a cover letter");

        let (status, body) = send(&app, "GET", &format!("/api/prompts/{id}"), &token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prompt"]["title"], "Cover letter");

        let (status, body) =
            send(&app, "DELETE", &format!("/api/prompts/{id}"), &token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Prompt deleted successfully");

        let (status, _) = send(&app, "GET", &format!("/api/prompts/{id}"), &token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_field_is_rejected_and_nothing_is_saved() {
        let (app, token) = test_router_with_auth().await;
        let mut input = sample();
        input.as_object_mut().unwrap().remove("tone");

        let (status, body) = send(&app, "POST", "/api/prompts", &token, Some(input)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("tone"));

        let (_, body) = send(&app, "GET", "/api/prompts", &token, None).await;
        assert_eq!(body["prompts"], json!([]));
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_a_json_400() {
        let (app, token) = test_router_with_auth().await;
        let mut input = sample();
        input["title"] = json!(42);

        let (status, body) = send(&app, "POST", "/api/prompts", &token, Some(input)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (_, body) = send(&app, "GET", "/api/prompts", &token, None).await;
        assert_eq!(body["prompts"], json!([]));
    }

    #[tokio::test]
    async fn other_users_cannot_see_or_delete() {
        let state = test_state(MockCompletion::new(), false, false);
        let owner = issue_key(&state, "alice").await;
        let intruder = issue_key(&state, "mallory").await;
        let app = build_router(state);

        let (_, body) = send(&app, "POST", "/api/prompts", &owner, Some(sample())).await;
        let id = body["prompt"]["id"].as_str().unwrap().to_string();
        let path = format!("/api/prompts/{id}");

        let (status, _) = send(&app, "GET", &path, &intruder, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", &path, &intruder, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, body) = send(&app, "GET", "/api/prompts", &intruder, None).await;
        assert_eq!(body["prompts"], json!([]));

        let (status, _) = send(&app, "GET", &path, &owner, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn storage_failure_reports_the_cause() {
        let db: Arc<dyn betterprompt_db::Database> = Arc::new(UnavailableDatabase);
        let state = Arc::new(InnerAppState {
            db: db.clone(),
            identity: IdentityConfig::new(db, Some("static-token"), "alice"),
            optimizer: Optimizer::new(Arc::new(MockCompletion::new()), Credentials::default()),
        });
        let app = build_router(state);

        let (status, body) = send(&app, "GET", "/api/prompts", "static-token", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Database error: internal error: connection refused");
    }
}
