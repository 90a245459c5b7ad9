// Backend-agnostic integration tests for the Database trait.
//
// Each public async function accepts `&dyn Database` so that the same logic
// can be exercised against both the SQLite and Postgres backends. Owners are
// random per test so runs against a shared Postgres database never collide.

#![allow(dead_code)]

use betterprompt_core::saved_prompt::CreateSavedPrompt;
use betterprompt_db::{Database, DbError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn owner() -> String {
    format!("user_{}", uuid::Uuid::new_v4().simple())
}

fn make_prompt(title: &str) -> CreateSavedPrompt {
    CreateSavedPrompt {
        title: Some(title.to_string()),
        original_prompt: Some("write an email to my landlord".into()),
        optimized_prompt: Some("Please draft a polite email to my landlord...".into()),
        model: Some("meta-llama/llama-3.1-8b-instruct:free".into()),
        tone: Some("friendly".into()),
        prompt_type: Some("content writing".into()),
    }
}

// ---------------------------------------------------------------------------
// Saved prompt tests
// ---------------------------------------------------------------------------

/// Create, get, list and delete for a single owner.
pub async fn test_prompt_crud(db: &dyn Database) {
    let alice = owner();
    let saved = db.create_prompt(&alice, &make_prompt("Landlord email")).await.unwrap();
    assert_eq!(saved.owner_id, alice);
    assert_eq!(saved.title, "Landlord email");
    assert_eq!(saved.tone, "friendly");

    let fetched = db.get_prompt(&saved.id, &alice).await.unwrap();
    assert_eq!(fetched.id, saved.id);
    assert_eq!(fetched.optimized_prompt, saved.optimized_prompt);

    let all = db.list_prompts(&alice).await.unwrap();
    assert_eq!(all.len(), 1);

    db.delete_prompt(&saved.id, &alice).await.unwrap();
    assert!(db.list_prompts(&alice).await.unwrap().is_empty());
    assert!(matches!(
        db.get_prompt(&saved.id, &alice).await,
        Err(DbError::NotFound(_))
    ));
}

/// A user with nothing saved gets an empty list, not an error.
pub async fn test_list_empty(db: &dyn Database) {
    let nobody = owner();
    assert!(db.list_prompts(&nobody).await.unwrap().is_empty());
}

/// Listing returns the newest record first.
pub async fn test_list_newest_first(db: &dyn Database) {
    let alice = owner();
    let mut created = Vec::new();
    for title in ["one", "two", "three"] {
        created.push(db.create_prompt(&alice, &make_prompt(title)).await.unwrap().id);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    created.reverse();

    let listed: Vec<String> = db
        .list_prompts(&alice)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(listed, created);
}

/// Another user can neither read, list nor delete a record.
pub async fn test_cross_owner_isolation(db: &dyn Database) {
    let alice = owner();
    let mallory = owner();
    let saved = db.create_prompt(&alice, &make_prompt("private")).await.unwrap();

    assert!(db.list_prompts(&mallory).await.unwrap().is_empty());
    assert!(matches!(
        db.get_prompt(&saved.id, &mallory).await,
        Err(DbError::NotFound(_))
    ));
    assert!(matches!(
        db.delete_prompt(&saved.id, &mallory).await,
        Err(DbError::NotFound(_))
    ));

    // Still there for the real owner.
    let still = db.get_prompt(&saved.id, &alice).await.unwrap();
    assert_eq!(still.id, saved.id);
}

/// A create with a missing field fails and persists nothing.
pub async fn test_create_validation(db: &dyn Database) {
    let alice = owner();
    let mut missing = make_prompt("x");
    missing.optimized_prompt = None;

    assert!(matches!(
        db.create_prompt(&alice, &missing).await,
        Err(DbError::InvalidInput(_))
    ));
    assert!(db.list_prompts(&alice).await.unwrap().is_empty());
}

/// Deleting an id that never existed reports NotFound.
pub async fn test_delete_unknown(db: &dyn Database) {
    let alice = owner();
    assert!(matches!(
        db.delete_prompt("does-not-exist", &alice).await,
        Err(DbError::NotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// Identity token tests
// ---------------------------------------------------------------------------

pub async fn test_api_key_lifecycle(db: &dyn Database) {
    let alice = owner();
    let hash = format!("hash_{}", uuid::Uuid::new_v4().simple());
    let key = db.insert_api_key(&alice, "cli", &hash).await.unwrap();
    assert_eq!(key.user_id, alice);

    let found = db.find_api_key_by_hash(&hash).await.unwrap().unwrap();
    assert_eq!(found.id, key.id);
    assert!(found.last_used_at.is_none());

    db.touch_api_key(&key.id).await.unwrap();
    let touched = db.find_api_key_by_hash(&hash).await.unwrap().unwrap();
    assert!(touched.last_used_at.is_some());

    assert!(db.list_api_keys().await.unwrap().iter().any(|k| k.id == key.id));

    db.delete_api_key(&key.id).await.unwrap();
    assert!(db.find_api_key_by_hash(&hash).await.unwrap().is_none());
    assert!(matches!(
        db.delete_api_key(&key.id).await,
        Err(DbError::NotFound(_))
    ));
}
