use chrono::{DateTime, Utc};

use betterprompt_core::saved_prompt::{CreateSavedPrompt, SavedPrompt};

use super::super::{pg_err, pg_not_found, PostgresDatabase};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct PromptRow {
    id: String,
    user_id: String,
    title: String,
    original_prompt: String,
    optimized_prompt: String,
    model: String,
    tone: String,
    #[sqlx(rename = "type")]
    prompt_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PromptRow> for SavedPrompt {
    fn from(r: PromptRow) -> Self {
        SavedPrompt {
            id: r.id,
            owner_id: r.user_id,
            title: r.title,
            original_prompt: r.original_prompt,
            optimized_prompt: r.optimized_prompt,
            model: r.model,
            tone: r.tone,
            prompt_type: r.prompt_type,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl PostgresDatabase {
    pub(crate) async fn pg_list_prompts(
        &self,
        owner_id: &str,
    ) -> Result<Vec<SavedPrompt>, DbError> {
        let rows = sqlx::query_as::<_, PromptRow>(
            "SELECT * FROM prompts WHERE user_id = $1 ORDER BY created_at DESC, seq DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    pub(crate) async fn pg_create_prompt(
        &self,
        owner_id: &str,
        input: &CreateSavedPrompt,
    ) -> Result<SavedPrompt, DbError> {
        let new = crate::validate_new_prompt(owner_id, input)?;
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        let row = sqlx::query_as::<_, PromptRow>(
            "INSERT INTO prompts (id, user_id, title, original_prompt, optimized_prompt,
                                  model, tone, type, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
        .bind(&id)
        .bind(owner_id)
        .bind(&new.title)
        .bind(&new.original_prompt)
        .bind(&new.optimized_prompt)
        .bind(&new.model)
        .bind(&new.tone)
        .bind(&new.prompt_type)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(row.into())
    }

    pub(crate) async fn pg_get_prompt(
        &self,
        id: &str,
        owner_id: &str,
    ) -> Result<SavedPrompt, DbError> {
        let row = sqlx::query_as::<_, PromptRow>(
            "SELECT * FROM prompts WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(pg_err)?
        .ok_or_else(|| pg_not_found(&format!("prompt {id}")))?;

        Ok(row.into())
    }

    pub(crate) async fn pg_delete_prompt(&self, id: &str, owner_id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(pg_err)?;

        if result.rows_affected() == 0 {
            return Err(pg_not_found(&format!("prompt {id}")));
        }

        Ok(())
    }
}
