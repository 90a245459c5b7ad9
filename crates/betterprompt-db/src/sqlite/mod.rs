pub(crate) mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use betterprompt_core::api_key::ApiKey;
use betterprompt_core::saved_prompt::{CreateSavedPrompt, SavedPrompt};

use crate::{Database, DbConfig, DbError};

/// Extension trait that converts `rusqlite::Result<T>` into `Result<T, DbError>`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("betterprompt.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).to_db()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    fn run_migrations(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            migrations::run(conn)?;
            Ok(())
        })
    }

    /// Run a synchronous query on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(SqliteDatabase) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(db))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
}

/// Map a `rusqlite::Error` into a `DbError::Internal`.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    DbError::Internal(e.to_string())
}

#[async_trait]
impl Database for SqliteDatabase {
    // -- Saved prompts --
    async fn list_prompts(&self, owner_id: &str) -> Result<Vec<SavedPrompt>, DbError> {
        let owner_id = owner_id.to_string();
        self.blocking(move |db| db.list_prompts_sync(&owner_id)).await
    }
    async fn create_prompt(
        &self,
        owner_id: &str,
        input: &CreateSavedPrompt,
    ) -> Result<SavedPrompt, DbError> {
        let owner_id = owner_id.to_string();
        let input = input.clone();
        self.blocking(move |db| db.create_prompt_sync(&owner_id, &input))
            .await
    }
    async fn get_prompt(&self, id: &str, owner_id: &str) -> Result<SavedPrompt, DbError> {
        let id = id.to_string();
        let owner_id = owner_id.to_string();
        self.blocking(move |db| db.get_prompt_sync(&id, &owner_id)).await
    }
    async fn delete_prompt(&self, id: &str, owner_id: &str) -> Result<(), DbError> {
        let id = id.to_string();
        let owner_id = owner_id.to_string();
        self.blocking(move |db| db.delete_prompt_sync(&id, &owner_id))
            .await
    }

    // -- Identity tokens --
    async fn insert_api_key(
        &self,
        user_id: &str,
        name: &str,
        key_hash: &str,
    ) -> Result<ApiKey, DbError> {
        let user_id = user_id.to_string();
        let name = name.to_string();
        let key_hash = key_hash.to_string();
        self.blocking(move |db| db.insert_api_key_sync(&user_id, &name, &key_hash))
            .await
    }
    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError> {
        let key_hash = key_hash.to_string();
        self.blocking(move |db| db.find_api_key_by_hash_sync(&key_hash))
            .await
    }
    async fn touch_api_key(&self, id: &str) -> Result<(), DbError> {
        let id = id.to_string();
        self.blocking(move |db| db.touch_api_key_sync(&id)).await
    }
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError> {
        self.blocking(|db| db.list_api_keys_sync()).await
    }
    async fn delete_api_key(&self, id: &str) -> Result<(), DbError> {
        let id = id.to_string();
        self.blocking(move |db| db.delete_api_key_sync(&id)).await
    }
}
