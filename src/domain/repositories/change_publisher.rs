//! Outbound port for change notifications.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::change_event::ChangeEvent;

/// Errors that can occur while publishing a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification connection error: {0}")]
    ConnectionError(String),
    #[error("Notification publish error: {0}")]
    PublishError(String),
}

/// Result type for publish operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Delivers [`ChangeEvent`]s to external subscribers.
///
/// Publishing is fire-and-forget relative to the write that triggered it:
/// callers log failures and never undo the write.
///
/// # Implementations
///
/// - [`crate::infrastructure::notify::RedisPublisher`] - Redis pub/sub
/// - [`crate::infrastructure::notify::BroadcastPublisher`] - in-process subscribers
/// - [`crate::infrastructure::notify::NullPublisher`] - notifications disabled
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangePublisher: Send + Sync {
    async fn publish(&self, event: ChangeEvent) -> NotifyResult<()>;
}
