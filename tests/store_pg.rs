//! PostgreSQL store tests. Require `DATABASE_URL`; run with `cargo test -- --ignored`.

use auth_store::AppError;
use auth_store::application::{ApiKeyRepository, UserRepository};
use auth_store::config::DynamicSettings;
use auth_store::domain::document::{Filter, Page};
use auth_store::domain::entities::{ApiKeyRecord, UserRecord};
use auth_store::domain::repositories::{Access, DocumentStore};
use auth_store::infrastructure::notify::NullPublisher;
use auth_store::infrastructure::persistence::PgDocumentStore;
use auth_store::utils::{KeyHasher, Sha256Hasher};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

fn store(pool: PgPool) -> Arc<PgDocumentStore> {
    Arc::new(PgDocumentStore::new(Arc::new(pool)))
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_upsert_inserts_then_updates(pool: PgPool) {
    let store = store(pool);

    let first = store
        .upsert("users", "u1", "name", json!({"name": "alice"}))
        .await
        .unwrap();
    let second = store
        .upsert("users", "u1", "name", json!({"name": "alice", "is_service": true}))
        .await
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(second.document["id"], "u1");
    assert_eq!(store.count("users", &Filter::new()).await.unwrap(), 1);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_by_nested_path(pool: PgPool) {
    let store = store(pool);
    store
        .upsert("users", "u1", "name", json!({"name": "alice", "nicknames": {"slack": "al"}}))
        .await
        .unwrap();
    store
        .upsert("users", "u2", "name", json!({"name": "bob", "nicknames": {"irc": "al"}}))
        .await
        .unwrap();

    let found = store
        .find(
            "users",
            &Filter::new().path_equals(["nicknames", "slack"], "al"),
            Page::limit(2),
        )
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "alice");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_respects_offset_and_order(pool: PgPool) {
    let store = store(pool);
    for i in 0..4 {
        store
            .upsert("api_keys", &format!("k{i}"), "key_hash", json!({"n": i}))
            .await
            .unwrap();
    }

    let page = store
        .find("api_keys", &Filter::new(), Page::limit(2).with_offset(1))
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["n"], 1);
    assert_eq!(page[1]["n"], 2);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_and_get(pool: PgPool) {
    let store = store(pool);
    store.upsert("tokens", "t1", "token", json!({"token": "x"})).await.unwrap();

    assert!(store.get("tokens", "t1").await.unwrap().is_some());
    assert!(store.delete("tokens", "t1").await.unwrap());
    assert!(store.get("tokens", "t1").await.unwrap().is_none());
    assert!(!store.delete("tokens", "t1").await.unwrap());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_repositories_over_postgres(pool: PgPool) {
    let store = store(pool);
    let publisher = Arc::new(NullPublisher::new());

    let users = UserRepository::new(Access::new(store.clone(), publisher.clone()));
    users
        .add_or_update(UserRecord::new("alice").with_nickname("slack", "al"), false)
        .await
        .unwrap();
    assert_eq!(
        users.get_by_nickname("al", "slack").await.unwrap().name,
        "alice"
    );

    let api_keys = ApiKeyRepository::new(
        Access::new(store.clone(), publisher),
        Arc::new(Sha256Hasher),
        Arc::new(DynamicSettings::new(100)),
    );
    api_keys
        .add_or_update(ApiKeyRecord::new("alice", Sha256Hasher.hash("raw")), false)
        .await
        .unwrap();
    assert_eq!(api_keys.get("raw", Some(1), 0).await.unwrap().user, "alice");
    assert!(store.health_check().await);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_natural_key_is_unique(pool: PgPool) {
    let store = store(pool);
    store
        .upsert("users", "u1", "name", json!({"name": "alice"}))
        .await
        .unwrap();

    let duplicate = store
        .upsert("users", "u2", "name", json!({"name": "alice"}))
        .await;

    assert!(matches!(duplicate, Err(AppError::Conflict { .. })));
    assert_eq!(store.count("users", &Filter::new()).await.unwrap(), 1);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_creates_end_with_one_row(pool: PgPool) {
    let store = store(pool);
    let users = UserRepository::new(Access::new(store.clone(), Arc::new(NullPublisher::new())));

    let (first, second) = tokio::join!(
        users.add_or_update(UserRecord::new("alice").with_nickname("slack", "al"), false),
        users.add_or_update(UserRecord::new("alice").with_nickname("slack", "al"), false),
    );

    for result in [&first, &second] {
        assert!(matches!(result, Ok(_) | Err(AppError::Conflict { .. })));
    }
    assert_eq!(store.count("users", &Filter::new()).await.unwrap(), 1);
    assert_eq!(
        users.get_by_nickname("al", "slack").await.unwrap().name,
        "alice"
    );
}
