//! In-process publisher over a tokio broadcast channel.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::change_event::ChangeEvent;
use crate::domain::repositories::{ChangePublisher, NotifyResult};

/// Fans change events out to subscribers in the same process.
///
/// Slow subscribers lose the oldest events once `capacity` is exceeded
/// (they observe `RecvError::Lagged`). Having no subscribers is not an error.
#[derive(Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<ChangeEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl ChangePublisher for BroadcastPublisher {
    async fn publish(&self, event: ChangeEvent) -> NotifyResult<()> {
        match self.sender.send(event) {
            Ok(receivers) => debug!("Change event delivered to {} subscribers", receivers),
            Err(_) => debug!("Change event dropped: no subscribers"),
        }
        Ok(())
    }
}
