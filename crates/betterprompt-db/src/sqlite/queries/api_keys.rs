use chrono::Utc;
use rusqlite::{params, Row};

use betterprompt_core::api_key::ApiKey;

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_api_key(row: &Row) -> rusqlite::Result<ApiKey> {
    Ok(ApiKey {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        key_hash: row.get("key_hash")?,
        created_at: row.get("created_at")?,
        last_used_at: row.get("last_used_at")?,
    })
}

impl SqliteDatabase {
    pub fn insert_api_key_sync(
        &self,
        user_id: &str,
        name: &str,
        key_hash: &str,
    ) -> Result<ApiKey, DbError> {
        if user_id.trim().is_empty() {
            return Err(DbError::InvalidInput("user id is required".into()));
        }
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO api_keys (id, user_id, name, key_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, user_id, name, key_hash, now],
            )
            .to_db()?;
            conn.query_row(
                "SELECT * FROM api_keys WHERE id = ?1",
                params![id],
                row_to_api_key,
            )
            .to_db()
        })
    }

    pub fn find_api_key_by_hash_sync(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError> {
        self.with_conn(|conn| {
            let result = conn.query_row(
                "SELECT * FROM api_keys WHERE key_hash = ?1",
                params![key_hash],
                row_to_api_key,
            );
            match result {
                Ok(key) => Ok(Some(key)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(DbError::Internal(e.to_string())),
            }
        })
    }

    pub fn touch_api_key_sync(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "UPDATE api_keys SET last_used_at = ?1 WHERE id = ?2",
                params![now, id],
            )
            .to_db()?;
            Ok(())
        })
    }

    pub fn list_api_keys_sync(&self) -> Result<Vec<ApiKey>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM api_keys ORDER BY created_at DESC")
                .to_db()?;
            let keys = stmt
                .query_map([], row_to_api_key)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(keys)
        })
    }

    pub fn delete_api_key_sync(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM api_keys WHERE id = ?1", params![id])
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("api_key {id}")));
            }
            Ok(())
        })
    }
}
