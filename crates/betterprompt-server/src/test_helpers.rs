use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use betterprompt_core::api_key::ApiKey;
use betterprompt_core::{CreateSavedPrompt, SavedPrompt};
use betterprompt_db::{Database, DbError, SqliteDatabase};
use betterprompt_optimizer::mock::MockCompletion;
use betterprompt_optimizer::{Credentials, Optimizer};
use tokio::net::TcpListener;

use crate::auth::{generate_api_key, sha256_hex, IdentityConfig};
use crate::routes::{build_router, AppState, InnerAppState};

/// User that [`test_router_with_auth`] issues its key to.
pub const TEST_USER: &str = "test-user";

/// App state over in-memory SQLite and a scripted completion backend.
/// `primary`/`secondary` choose which credential slots are configured.
pub fn test_state(backend: MockCompletion, primary: bool, secondary: bool) -> AppState {
    let db: Arc<dyn Database> = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    test_state_with_db(db, backend, primary, secondary)
}

/// Like [`test_state`], over the given record store.
pub fn test_state_with_db(
    db: Arc<dyn Database>,
    backend: MockCompletion,
    primary: bool,
    secondary: bool,
) -> AppState {
    let credentials = Credentials::from_raw(
        primary.then_some("test-primary-key"),
        secondary.then_some("test-secondary-key"),
    );
    Arc::new(InnerAppState {
        optimizer: Optimizer::new(Arc::new(backend), credentials),
        identity: IdentityConfig::new(db.clone(), None, TEST_USER),
        db,
    })
}

/// Issue an identity token for `user`, returning the raw bearer value.
pub async fn issue_key(state: &AppState, user: &str) -> String {
    let raw = generate_api_key();
    state
        .db
        .insert_api_key(user, "test", &sha256_hex(&raw))
        .await
        .unwrap();
    raw
}

/// Router with no completion credentials and one token for [`TEST_USER`].
pub async fn test_router_with_auth() -> (Router, String) {
    let state = test_state(MockCompletion::new(), false, false);
    let api_key = issue_key(&state, TEST_USER).await;
    (build_router(state), api_key)
}

/// Router over the given backend, plus its state for issuing tokens.
pub async fn test_router_with_backend(
    backend: MockCompletion,
    primary: bool,
    secondary: bool,
) -> (Router, AppState) {
    let state = test_state(backend, primary, secondary);
    (build_router(state.clone()), state)
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn the app on a random port over the given backend.
pub async fn spawn_test_server(
    backend: MockCompletion,
    primary: bool,
    secondary: bool,
) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let state = test_state(backend, primary, secondary);
    let app = build_router(state.clone());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        state,
        _handle: handle,
    }
}

/// A record store whose every call fails, as if the backend were down.
pub struct UnavailableDatabase;

fn unavailable<T>() -> Result<T, DbError> {
    Err(DbError::Internal("connection refused".into()))
}

#[async_trait]
impl Database for UnavailableDatabase {
    async fn list_prompts(&self, _owner_id: &str) -> Result<Vec<SavedPrompt>, DbError> {
        unavailable()
    }
    async fn create_prompt(
        &self,
        _owner_id: &str,
        _input: &CreateSavedPrompt,
    ) -> Result<SavedPrompt, DbError> {
        unavailable()
    }
    async fn get_prompt(&self, _id: &str, _owner_id: &str) -> Result<SavedPrompt, DbError> {
        unavailable()
    }
    async fn delete_prompt(&self, _id: &str, _owner_id: &str) -> Result<(), DbError> {
        unavailable()
    }
    async fn insert_api_key(
        &self,
        _user_id: &str,
        _name: &str,
        _key_hash: &str,
    ) -> Result<ApiKey, DbError> {
        unavailable()
    }
    async fn find_api_key_by_hash(&self, _key_hash: &str) -> Result<Option<ApiKey>, DbError> {
        unavailable()
    }
    async fn touch_api_key(&self, _id: &str) -> Result<(), DbError> {
        unavailable()
    }
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError> {
        unavailable()
    }
    async fn delete_api_key(&self, _id: &str) -> Result<(), DbError> {
        unavailable()
    }
}
