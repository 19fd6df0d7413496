//! Change notification delivery.
//!
//! Implementations of [`crate::domain::repositories::ChangePublisher`]:
//! - [`RedisPublisher`] - Redis pub/sub for subscribers in other processes
//! - [`BroadcastPublisher`] - in-process subscribers via a tokio broadcast channel
//! - [`NullPublisher`] - no-op when notifications are disabled

mod broadcast_publisher;
mod null_publisher;
mod redis_publisher;

pub use broadcast_publisher::BroadcastPublisher;
pub use null_publisher::NullPublisher;
pub use redis_publisher::RedisPublisher;
