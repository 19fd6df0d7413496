use async_trait::async_trait;
use auth_store::AppError;
use auth_store::AuthStore;
use auth_store::config::DynamicSettings;
use auth_store::domain::document::{Filter, Page};
use auth_store::domain::entities::{TokenRecord, UserRecord};
use auth_store::domain::repositories::{DocumentStore, Upserted};
use auth_store::infrastructure::notify::NullPublisher;
use auth_store::infrastructure::persistence::MemoryStore;
use auth_store::utils::Sha256Hasher;
use chrono::{Duration, Utc};
use serde_json::Value;
use std::sync::Arc;

/// MemoryStore that yields before every read, like a store behind a network
/// round-trip, so concurrent writers interleave between lookup and write.
struct YieldingStore {
    inner: MemoryStore,
}

#[async_trait]
impl DocumentStore for YieldingStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        page: Page,
    ) -> Result<Vec<Value>, AppError> {
        let found = self.inner.find(collection, filter, page).await;
        tokio::task::yield_now().await;
        found
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, AppError> {
        self.inner.count(collection, filter).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        self.inner.get(collection, id).await
    }

    async fn upsert(
        &self,
        collection: &str,
        id: &str,
        key_field: &str,
        document: Value,
    ) -> Result<Upserted, AppError> {
        self.inner.upsert(collection, id, key_field, document).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        self.inner.delete(collection, id).await
    }

    async fn health_check(&self) -> bool {
        true
    }
}

fn create_interleaving_auth() -> (AuthStore, Arc<YieldingStore>) {
    let store = Arc::new(YieldingStore {
        inner: MemoryStore::new(),
    });
    let auth = AuthStore::new(
        store.clone(),
        Arc::new(NullPublisher::new()),
        Arc::new(Sha256Hasher),
        Arc::new(DynamicSettings::new(100)),
    );
    (auth, store)
}

#[tokio::test]
async fn test_concurrent_user_creates_end_with_one_record() {
    let (auth, store) = create_interleaving_auth();

    let (first, second) = tokio::join!(
        auth.users.add_or_update(
            UserRecord::new("alice").with_nickname("slack", "al"),
            false
        ),
        auth.users.add_or_update(
            UserRecord::new("alice").with_nickname("slack", "al"),
            false
        ),
    );

    let first = first.unwrap();
    let second = second.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(store.count("users", &Filter::new()).await.unwrap(), 1);

    let user = auth.users.get_by_nickname("al", "slack").await.unwrap();
    assert_eq!(user.id, first.id);
}

#[tokio::test]
async fn test_concurrent_token_writes_keep_value_unique() {
    let (auth, store) = create_interleaving_auth();
    let expiry = Utc::now() + Duration::hours(1);

    let (first, second) = tokio::join!(
        auth.tokens
            .add_or_update(TokenRecord::new("bob", "shared", expiry), false),
        auth.tokens
            .add_or_update(TokenRecord::new("carol", "shared", expiry), false),
    );

    assert_eq!(first.unwrap().id, second.unwrap().id);
    assert_eq!(store.count("tokens", &Filter::new()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_renaming_onto_taken_name_conflicts() {
    let (auth, _) = create_interleaving_auth();
    auth.users
        .add_or_update(UserRecord::new("alice"), false)
        .await
        .unwrap();
    let mut bob = auth
        .users
        .add_or_update(UserRecord::new("bob"), false)
        .await
        .unwrap();

    bob.name = "alice".to_string();
    let result = auth.users.add_or_update(bob, false).await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
    assert_eq!(auth.users.get("bob").await.unwrap().name, "bob");
}
