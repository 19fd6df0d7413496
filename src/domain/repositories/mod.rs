//! Storage ports and the generic access primitive.
//!
//! This module defines the interfaces (traits) that abstract persistence and
//! change notification, and the typed [`Access`] primitive the auth
//! repositories are built on.
//!
//! # Architecture
//!
//! - Traits define the contract for storage and notification
//! - Implementations live in `crate::infrastructure`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Ports
//!
//! - [`DocumentStore`] - JSON document persistence
//! - [`ChangePublisher`] - Change notification delivery

pub mod access;
pub mod change_publisher;
pub mod document_store;

pub use access::Access;
pub use change_publisher::{ChangePublisher, NotifyError, NotifyResult};
pub use document_store::{DocumentStore, Upserted};

#[cfg(test)]
pub use change_publisher::MockChangePublisher;
#[cfg(test)]
pub use document_store::MockDocumentStore;
