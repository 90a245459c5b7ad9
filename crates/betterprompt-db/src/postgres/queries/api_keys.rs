use chrono::Utc;

use betterprompt_core::api_key::ApiKey;

use super::super::{pg_err, pg_not_found, PostgresDatabase};
use crate::DbError;

/// Key timestamps are plain TEXT, matching the core `ApiKey` type.
#[derive(sqlx::FromRow)]
struct ApiKeyRow {
    id: String,
    user_id: String,
    name: String,
    key_hash: String,
    created_at: String,
    last_used_at: Option<String>,
}

impl From<ApiKeyRow> for ApiKey {
    fn from(r: ApiKeyRow) -> Self {
        ApiKey {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            key_hash: r.key_hash,
            created_at: r.created_at,
            last_used_at: r.last_used_at,
        }
    }
}

impl PostgresDatabase {
    pub(crate) async fn pg_insert_api_key(
        &self,
        user_id: &str,
        name: &str,
        key_hash: &str,
    ) -> Result<ApiKey, DbError> {
        if user_id.trim().is_empty() {
            return Err(DbError::InvalidInput("user id is required".into()));
        }
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let row = sqlx::query_as::<_, ApiKeyRow>(
            "INSERT INTO api_keys (id, user_id, name, key_hash, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&id)
        .bind(user_id)
        .bind(name)
        .bind(key_hash)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(row.into())
    }

    pub(crate) async fn pg_find_api_key_by_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiKey>, DbError> {
        let row = sqlx::query_as::<_, ApiKeyRow>("SELECT * FROM api_keys WHERE key_hash = $1")
            .bind(key_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(pg_err)?;

        Ok(row.map(|r| r.into()))
    }

    pub(crate) async fn pg_touch_api_key(&self, id: &str) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query("UPDATE api_keys SET last_used_at = $1 WHERE id = $2")
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(pg_err)?;

        Ok(())
    }

    pub(crate) async fn pg_list_api_keys(&self) -> Result<Vec<ApiKey>, DbError> {
        let rows =
            sqlx::query_as::<_, ApiKeyRow>("SELECT * FROM api_keys ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(pg_err)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    pub(crate) async fn pg_delete_api_key(&self, id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(pg_err)?;

        if result.rows_affected() == 0 {
            return Err(pg_not_found(&format!("api_key {id}")));
        }

        Ok(())
    }
}
