use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use betterprompt_optimizer::{OptimizationRequest, OptimizationResult, OptimizeError};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use super::{json_body, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/optimize", post(optimize))
        .route("/api/optimize/local", post(optimize_local))
        .route("/api/optimize/keys", get(check_keys))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OptimizeBody {
    prompt: Option<String>,
    model: Option<String>,
    tone: Option<String>,
    #[serde(rename = "type")]
    prompt_type: Option<String>,
    /// Substitute the local rewriter when the remote service is unavailable.
    fallback: bool,
}

async fn optimize(
    State(state): State<AppState>,
    payload: Result<Json<OptimizeBody>, JsonRejection>,
) -> Result<Json<OptimizationResult>, (StatusCode, Json<Value>)> {
    let body = json_body(payload)?;
    let request = OptimizationRequest::from_wire(
        body.prompt.as_deref(),
        body.model.as_deref(),
        body.tone.as_deref(),
        body.prompt_type.as_deref(),
    )
    .map_err(to_error)?;

    let result = if body.fallback {
        state.optimizer.optimize_or_fallback(&request).await
    } else {
        state.optimizer.optimize(&request).await
    };
    result.map(Json).map_err(to_error)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocalBody {
    prompt: Option<String>,
}

async fn optimize_local(
    payload: Result<Json<LocalBody>, JsonRejection>,
) -> Result<Json<OptimizationResult>, (StatusCode, Json<Value>)> {
    let body = json_body(payload)?;
    let request = OptimizationRequest::new(body.prompt.unwrap_or_default()).map_err(to_error)?;
    Ok(Json(OptimizationResult::local(&request.raw_prompt, None)))
}

async fn check_keys(State(state): State<AppState>) -> Json<Value> {
    let report = state.optimizer.probe_credentials().await;
    let both = report.primary_key.configured && report.secondary_key.configured;
    Json(json!({
        "message": "API Key Status Check",
        "keys": report,
        "totalDailyLimit": if both { "400 requests (200 + 200)" } else { "200 requests" },
    }))
}

fn to_error(e: OptimizeError) -> (StatusCode, Json<Value>) {
    let status =
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(status = status.as_u16(), "optimize failed: {e}");
    } else {
        warn!(status = status.as_u16(), "optimize rejected: {e}");
    }
    (status, Json(json!({ "error": e.to_string() })))
}
