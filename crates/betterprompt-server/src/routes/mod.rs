pub mod health;
pub mod optimize;
pub mod prompts;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::{middleware, Json, Router};
use betterprompt_db::Database;
use betterprompt_optimizer::Optimizer;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::auth::{auth_middleware, IdentityConfig};

pub struct InnerAppState {
    pub db: Arc<dyn Database>,
    pub optimizer: Optimizer,
    pub identity: IdentityConfig,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .merge(health::routes())
        .merge(optimize::routes());

    let protected = Router::new()
        .merge(prompts::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public
        .merge(protected)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Unwrap a JSON body, reporting any rejection (bad syntax, wrong field
/// types, missing content type) as a 400 in the usual `{error}` shape.
pub(crate) fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, (StatusCode, Json<Value>)> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::warn!(
            status = %rejection.status(),
            "rejected request body: {}",
            rejection.body_text()
        );
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": rejection.body_text() })),
        )
    })
}
