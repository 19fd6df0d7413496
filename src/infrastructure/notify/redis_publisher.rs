//! Redis pub/sub publisher.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

use crate::domain::change_event::ChangeEvent;
use crate::domain::repositories::{ChangePublisher, NotifyError, NotifyResult};

/// Publishes change events as JSON on `<prefix>:<collection>` channels.
///
/// Uses `ConnectionManager` for automatic reconnection.
pub struct RedisPublisher {
    client: ConnectionManager,
    channel_prefix: String,
}

impl RedisPublisher {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, channel_prefix: &str) -> NotifyResult<Self> {
        info!("Connecting to Redis for change notifications");

        let client = Client::open(redis_url).map_err(|e| {
            NotifyError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            NotifyError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| NotifyError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            channel_prefix: channel_prefix.to_string(),
        })
    }

    fn channel(&self, collection: &str) -> String {
        format!("{}:{}", self.channel_prefix, collection)
    }
}

#[async_trait]
impl ChangePublisher for RedisPublisher {
    async fn publish(&self, event: ChangeEvent) -> NotifyResult<()> {
        let channel = self.channel(&event.collection);
        let payload = serde_json::to_string(&event)
            .map_err(|e| NotifyError::PublishError(format!("Failed to encode event: {}", e)))?;
        let mut conn = self.client.clone();

        match conn.publish::<_, _, i64>(&channel, payload).await {
            Ok(receivers) => {
                debug!("PUBLISH {} -> {} receivers", channel, receivers);
                Ok(())
            }
            Err(e) => {
                warn!("Redis PUBLISH error on {}: {}", channel, e);
                Err(NotifyError::PublishError(e.to_string()))
            }
        }
    }
}
