//! Composition root wiring the repositories to a store, a publisher, a hasher
//! and runtime settings.

use std::sync::Arc;

use crate::application::{ApiKeyRepository, TokenRepository, UserRepository};
use crate::config::{Config, DynamicSettings};
use crate::domain::repositories::{Access, ChangePublisher, DocumentStore};
use crate::error::AppError;
use crate::infrastructure::notify::{NullPublisher, RedisPublisher};
use crate::infrastructure::persistence::{MemoryStore, PgDocumentStore};
use crate::utils::{HmacSha256Hasher, KeyHasher, Sha256Hasher};

/// The three auth repositories sharing one store.
///
/// Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct AuthStore {
    pub users: UserRepository,
    pub tokens: TokenRepository,
    pub api_keys: ApiKeyRepository,
    store: Arc<dyn DocumentStore>,
    settings: Arc<DynamicSettings>,
}

impl AuthStore {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        publisher: Arc<dyn ChangePublisher>,
        hasher: Arc<dyn KeyHasher>,
        settings: Arc<DynamicSettings>,
    ) -> Self {
        Self {
            users: UserRepository::new(Access::new(store.clone(), publisher.clone())),
            tokens: TokenRepository::new(Access::new(store.clone(), publisher.clone())),
            api_keys: ApiKeyRepository::new(
                Access::new(store.clone(), publisher),
                hasher,
                settings.clone(),
            ),
            store,
            settings,
        }
    }

    /// In-memory store, no notifications, SHA-256 digests, default settings.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(NullPublisher::new()),
            Arc::new(Sha256Hasher),
            Arc::new(DynamicSettings::default()),
        )
    }

    /// Connects to PostgreSQL (running migrations) and, if configured, Redis.
    ///
    /// A Redis connection failure is not fatal: notifications fall back to
    /// [`NullPublisher`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the database is unreachable or a
    /// migration fails.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let store = PgDocumentStore::connect(config).await?;

        let publisher: Arc<dyn ChangePublisher> = match &config.redis_url {
            Some(redis_url) => {
                match RedisPublisher::connect(redis_url, &config.notify_channel_prefix).await {
                    Ok(redis) => {
                        tracing::info!("Change notifications enabled (Redis)");
                        Arc::new(redis)
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Failed to connect to Redis: {}. Change notifications disabled.",
                            e
                        );
                        Arc::new(NullPublisher::new())
                    }
                }
            }
            None => {
                tracing::info!("Change notifications disabled");
                Arc::new(NullPublisher::new())
            }
        };

        Ok(Self::new(
            Arc::new(store),
            publisher,
            hasher_for(config),
            Arc::new(DynamicSettings::from_config(config)),
        ))
    }

    /// Runtime settings; changes apply to the next repository call.
    pub fn settings(&self) -> &DynamicSettings {
        &self.settings
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }
}

/// HMAC-SHA256 when a hash secret is configured, plain SHA-256 otherwise.
pub fn hasher_for(config: &Config) -> Arc<dyn KeyHasher> {
    match &config.api_key_hash_secret {
        Some(secret) => Arc::new(HmacSha256Hasher::new(secret.as_bytes())),
        None => Arc::new(Sha256Hasher),
    }
}
