use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use betterprompt_db::{Database, DbError};

use crate::routes::AppState;

/// The authenticated caller, inserted as a request extension by [`auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

/// How bearer tokens resolve to a user.
pub struct IdentityConfig {
    /// SHA-256 hash of the `BETTERPROMPT_API_KEY` env var (if set).
    pub env_key_hash: Option<String>,
    /// User the env token resolves to.
    pub default_user: String,
    /// Database handle for user-scoped API keys.
    pub db: Arc<dyn Database>,
}

impl IdentityConfig {
    /// Build from an explicit static token (testable without env mutation).
    pub fn new(db: Arc<dyn Database>, env_key: Option<&str>, default_user: &str) -> Self {
        let env_key_hash = env_key.filter(|k| !k.is_empty()).map(sha256_hex);
        Self {
            env_key_hash,
            default_user: default_user.to_string(),
            db,
        }
    }

    /// Resolve a raw bearer token to its user.
    ///
    /// `Ok(None)` means the token is unknown. A failing key store is an
    /// error, not an unknown token.
    pub async fn resolve(&self, token: &str) -> Result<Option<UserId>, DbError> {
        let token_hash = sha256_hex(token);

        if let Some(ref env_hash) = self.env_key_hash {
            if constant_time_eq(&token_hash, env_hash) {
                return Ok(Some(UserId(self.default_user.clone())));
            }
        }

        let Some(api_key) = self.db.find_api_key_by_hash(&token_hash).await? else {
            return Ok(None);
        };

        // Fire-and-forget: update last_used_at
        let db = self.db.clone();
        let key_id = api_key.id.clone();
        tokio::spawn(async move {
            if let Err(e) = db.touch_api_key(&key_id).await {
                debug!(key_id = %key_id, "failed to touch api key: {e}");
            }
        });
        Ok(Some(UserId(api_key.user_id)))
    }
}

/// SHA-256 hash a raw key, returning the hex-encoded digest.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a new API key: `bp_` + 43 chars of base62-encoded random bytes.
pub fn generate_api_key() -> String {
    use rand::Rng;
    const BASE62: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let random_part: String = (0..43)
        .map(|_| BASE62[rng.gen_range(0..BASE62.len())] as char)
        .collect();
    format!("bp_{random_part}")
}

/// Axum middleware that resolves the caller's identity.
///
/// Requires `Authorization: Bearer <token>`; the resolved [`UserId`] is made
/// available to handlers as an extension. A missing or unknown token is a
/// 401; a failing key store is a 500.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let user = match token {
        Some(token) => state.identity.resolve(token).await,
        None => Ok(None),
    };

    match user {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized - No user ID found" })),
        )
            .into_response(),
        Err(e) => {
            error!("api key lookup failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Database error: {e}") })),
            )
                .into_response()
        }
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
