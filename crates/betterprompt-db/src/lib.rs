#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use betterprompt_core::api_key::ApiKey;
use betterprompt_core::saved_prompt::{CreateSavedPrompt, NewSavedPrompt, SavedPrompt};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

#[cfg(feature = "postgres")]
pub use postgres::PostgresDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the record store lives.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Postgres connection URL. Takes precedence when the `postgres` feature is on.
    pub database_url: Option<String>,
    /// SQLite file path. Defaults to `$XDG_DATA_HOME/betterprompt/betterprompt.db`.
    pub sqlite_path: Option<String>,
}

/// Owner-scoped record store for saved prompts plus identity tokens.
///
/// Every prompt operation takes the requesting `owner_id` and carries it in
/// the statement predicate, so a row owned by someone else is
/// indistinguishable from a missing row.
#[async_trait]
pub trait Database: Send + Sync {
    // -- Saved prompts --
    /// Newest-created first. Empty when the owner has saved nothing.
    async fn list_prompts(&self, owner_id: &str) -> Result<Vec<SavedPrompt>, DbError>;
    /// Validates `input`; nothing is written when a required field is missing.
    async fn create_prompt(
        &self,
        owner_id: &str,
        input: &CreateSavedPrompt,
    ) -> Result<SavedPrompt, DbError>;
    async fn get_prompt(&self, id: &str, owner_id: &str) -> Result<SavedPrompt, DbError>;
    async fn delete_prompt(&self, id: &str, owner_id: &str) -> Result<(), DbError>;

    // -- Identity tokens --
    async fn insert_api_key(
        &self,
        user_id: &str,
        name: &str,
        key_hash: &str,
    ) -> Result<ApiKey, DbError>;
    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError>;
    async fn touch_api_key(&self, id: &str) -> Result<(), DbError>;
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError>;
    async fn delete_api_key(&self, id: &str) -> Result<(), DbError>;
}

/// Shared validation run by every backend before an insert.
pub(crate) fn validate_new_prompt(
    owner_id: &str,
    input: &CreateSavedPrompt,
) -> Result<NewSavedPrompt, DbError> {
    if owner_id.trim().is_empty() {
        return Err(DbError::InvalidInput("owner id is required".into()));
    }
    input
        .validate()
        .map_err(|e| DbError::InvalidInput(e.to_string()))
}

/// Open the configured backend.
pub async fn open_database(config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    #[cfg(feature = "postgres")]
    if let Some(url) = config.database_url.as_deref() {
        tracing::info!("using postgres record store");
        let db = PostgresDatabase::connect(url).await?;
        return Ok(Arc::new(db));
    }

    open_local(config)
}

#[cfg(feature = "sqlite")]
fn open_local(config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    let db = SqliteDatabase::open(config)?;
    Ok(Arc::new(db))
}

#[cfg(not(feature = "sqlite"))]
fn open_local(_config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    Err(DbError::Internal(
        "no storage backend available: set DATABASE_URL with the postgres feature".into(),
    ))
}

pub(crate) fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("betterprompt")
}
