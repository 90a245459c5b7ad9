pub(crate) mod migrations;
pub mod queries;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use betterprompt_core::api_key::ApiKey;
use betterprompt_core::saved_prompt::{CreateSavedPrompt, SavedPrompt};

use crate::{Database, DbError};

/// Map a sqlx::Error into a DbError::Internal.
pub(crate) fn pg_err(e: sqlx::Error) -> DbError {
    DbError::Internal(e.to_string())
}

/// Create a DbError::NotFound with the given entity description.
pub(crate) fn pg_not_found(entity: &str) -> DbError {
    DbError::NotFound(entity.to_string())
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pub(crate) pool: PgPool,
}

impl PostgresDatabase {
    /// Connect to a Postgres database and run migrations.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(pg_err)?;

        let db = Self { pool };
        migrations::run(&db.pool).await?;
        Ok(db)
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    // -- Saved prompts --
    async fn list_prompts(&self, owner_id: &str) -> Result<Vec<SavedPrompt>, DbError> {
        self.pg_list_prompts(owner_id).await
    }
    async fn create_prompt(
        &self,
        owner_id: &str,
        input: &CreateSavedPrompt,
    ) -> Result<SavedPrompt, DbError> {
        self.pg_create_prompt(owner_id, input).await
    }
    async fn get_prompt(&self, id: &str, owner_id: &str) -> Result<SavedPrompt, DbError> {
        self.pg_get_prompt(id, owner_id).await
    }
    async fn delete_prompt(&self, id: &str, owner_id: &str) -> Result<(), DbError> {
        self.pg_delete_prompt(id, owner_id).await
    }

    // -- Identity tokens --
    async fn insert_api_key(
        &self,
        user_id: &str,
        name: &str,
        key_hash: &str,
    ) -> Result<ApiKey, DbError> {
        self.pg_insert_api_key(user_id, name, key_hash).await
    }
    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError> {
        self.pg_find_api_key_by_hash(key_hash).await
    }
    async fn touch_api_key(&self, id: &str) -> Result<(), DbError> {
        self.pg_touch_api_key(id).await
    }
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError> {
        self.pg_list_api_keys().await
    }
    async fn delete_api_key(&self, id: &str) -> Result<(), DbError> {
        self.pg_delete_api_key(id).await
    }
}
