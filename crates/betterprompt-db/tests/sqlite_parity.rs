// Integration tests that exercise every Database trait method against the
// in-memory SQLite backend.  The actual test logic lives in `common/mod.rs`
// so that the same assertions can be re-used for Postgres.

#![cfg(feature = "sqlite")]

mod common;

use std::sync::Arc;

use betterprompt_db::Database;

async fn make_db() -> Arc<dyn Database> {
    Arc::new(betterprompt_db::SqliteDatabase::open_in_memory().unwrap())
}

#[tokio::test]
async fn prompt_crud() {
    let db = make_db().await;
    common::test_prompt_crud(&*db).await;
}

#[tokio::test]
async fn list_empty() {
    let db = make_db().await;
    common::test_list_empty(&*db).await;
}

#[tokio::test]
async fn list_newest_first() {
    let db = make_db().await;
    common::test_list_newest_first(&*db).await;
}

#[tokio::test]
async fn cross_owner_isolation() {
    let db = make_db().await;
    common::test_cross_owner_isolation(&*db).await;
}

#[tokio::test]
async fn create_validation() {
    let db = make_db().await;
    common::test_create_validation(&*db).await;
}

#[tokio::test]
async fn delete_unknown() {
    let db = make_db().await;
    common::test_delete_unknown(&*db).await;
}

#[tokio::test]
async fn api_key_lifecycle() {
    let db = make_db().await;
    common::test_api_key_lifecycle(&*db).await;
}
