use sqlx::{PgConnection, PgPool};
use tracing::warn;

use crate::DbError;

/// Fixed key for the advisory lock that serialises migration runs.
const MIGRATION_LOCK_KEY: i64 = 0x6265_7474_7270_726d; // "bettrprm"

fn pg_err(e: sqlx::Error) -> DbError {
    DbError::Internal(e.to_string())
}

pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    // Advisory locks are per session: lock, migrate and unlock on one connection.
    let mut conn = pool.acquire().await.map_err(pg_err)?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *conn)
        .await
        .map_err(pg_err)?;

    let result = run_inner(&mut conn).await;

    if let Err(e) = sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *conn)
        .await
    {
        warn!("failed to release migration lock: {e}");
    }

    result
}

async fn run_inner(conn: &mut PgConnection) -> Result<(), DbError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(&mut *conn)
    .await
    .map_err(pg_err)?;

    let current: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
        .fetch_one(&mut *conn)
        .await
        .map_err(pg_err)?;

    if current < 1 {
        sqlx::raw_sql(include_str!("sql/V1__initial.sql"))
            .execute(&mut *conn)
            .await
            .map_err(pg_err)?;
    }

    Ok(())
}
