//! No-op publisher for disabled notifications.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::change_event::ChangeEvent;
use crate::domain::repositories::{ChangePublisher, NotifyResult};

/// A publisher that drops every event.
///
/// Used when no notification backend is configured, or as a fallback when
/// Redis is unreachable at startup.
pub struct NullPublisher;

impl NullPublisher {
    pub fn new() -> Self {
        debug!("Using NullPublisher (change notifications disabled)");
        Self
    }
}

impl Default for NullPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChangePublisher for NullPublisher {
    async fn publish(&self, _event: ChangeEvent) -> NotifyResult<()> {
        Ok(())
    }
}
