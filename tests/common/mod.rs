#![allow(dead_code)]

use auth_store::AuthStore;
use auth_store::config::DynamicSettings;
use auth_store::domain::change_event::ChangeEvent;
use auth_store::domain::entities::{ApiKeyRecord, UserRecord};
use auth_store::infrastructure::notify::BroadcastPublisher;
use auth_store::infrastructure::persistence::MemoryStore;
use auth_store::utils::Sha256Hasher;
use std::sync::Arc;
use tokio::sync::broadcast;

pub fn create_test_auth() -> AuthStore {
    AuthStore::in_memory()
}

pub fn create_test_auth_with_events() -> (AuthStore, broadcast::Receiver<ChangeEvent>) {
    let publisher = BroadcastPublisher::new(64);
    let rx = publisher.subscribe();

    let auth = AuthStore::new(
        Arc::new(MemoryStore::new()),
        Arc::new(publisher),
        Arc::new(Sha256Hasher),
        Arc::new(DynamicSettings::new(100)),
    );

    (auth, rx)
}

pub async fn create_test_user(auth: &AuthStore, name: &str, nicknames: &[(&str, &str)]) -> UserRecord {
    let user = nicknames
        .iter()
        .fold(UserRecord::new(name), |user, (origin, nick)| {
            user.with_nickname(*origin, *nick)
        });

    auth.users.add_or_update(user, false).await.unwrap()
}

pub async fn create_test_api_key(auth: &AuthStore, user: &str, raw_key: &str) -> ApiKeyRecord {
    let key = ApiKeyRecord::new(user, auth.api_keys.hash_key(raw_key));

    auth.api_keys.add_or_update(key, false).await.unwrap()
}
