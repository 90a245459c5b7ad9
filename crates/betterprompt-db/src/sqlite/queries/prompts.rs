use chrono::Utc;
use rusqlite::{params, Row};

use betterprompt_core::saved_prompt::{CreateSavedPrompt, SavedPrompt};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_prompt(row: &Row) -> rusqlite::Result<SavedPrompt> {
    Ok(SavedPrompt {
        id: row.get("id")?,
        owner_id: row.get("user_id")?,
        title: row.get("title")?,
        original_prompt: row.get("original_prompt")?,
        optimized_prompt: row.get("optimized_prompt")?,
        model: row.get("model")?,
        tone: row.get("tone")?,
        prompt_type: row.get("type")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl SqliteDatabase {
    pub fn list_prompts_sync(&self, owner_id: &str) -> Result<Vec<SavedPrompt>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT * FROM prompts WHERE user_id = ?1
                     ORDER BY created_at DESC, rowid DESC",
                )
                .to_db()?;
            let prompts = stmt
                .query_map(params![owner_id], row_to_prompt)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(prompts)
        })
    }

    pub fn create_prompt_sync(
        &self,
        owner_id: &str,
        input: &CreateSavedPrompt,
    ) -> Result<SavedPrompt, DbError> {
        let new = crate::validate_new_prompt(owner_id, input)?;
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO prompts (id, user_id, title, original_prompt, optimized_prompt,
                                      model, tone, type, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id,
                    owner_id,
                    new.title,
                    new.original_prompt,
                    new.optimized_prompt,
                    new.model,
                    new.tone,
                    new.prompt_type,
                    now,
                    now
                ],
            )
            .to_db()?;
            conn.query_row(
                "SELECT * FROM prompts WHERE id = ?1 AND user_id = ?2",
                params![id, owner_id],
                row_to_prompt,
            )
            .to_db()
        })
    }

    pub fn get_prompt_sync(&self, id: &str, owner_id: &str) -> Result<SavedPrompt, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM prompts WHERE id = ?1 AND user_id = ?2",
                params![id, owner_id],
                row_to_prompt,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("prompt {id}")),
                other => DbError::Internal(other.to_string()),
            })
        })
    }

    pub fn delete_prompt_sync(&self, id: &str, owner_id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "DELETE FROM prompts WHERE id = ?1 AND user_id = ?2",
                    params![id, owner_id],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("prompt {id}")));
            }
            Ok(())
        })
    }
}
