//! Storage port for JSON documents grouped into collections.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::document::{Filter, Page};
use crate::error::AppError;

/// Outcome of an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted {
    /// The document as stored, including its `id`.
    pub document: Value,
    /// `true` if no document with that id existed before.
    pub created: bool,
}

/// Backing store for all auth collections.
///
/// Implementations must make [`DocumentStore::upsert`] atomic per `(collection, id)`:
/// concurrent writers on the same id end with one complete document, never a mix.
/// They must also keep each collection's natural key unique, so that two
/// writers racing to create the same record cannot both succeed.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgDocumentStore`] - PostgreSQL JSONB implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns documents matching `filter`, in insertion order, windowed by `page`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on backend errors.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        page: Page,
    ) -> Result<Vec<Value>, AppError>;

    /// Counts documents matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on backend errors.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, AppError>;

    /// Fetches a document by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on backend errors.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError>;

    /// Inserts the document under `id`, or replaces the one already there.
    ///
    /// The stored document's `id` field is set to `id`. `key_field` names the
    /// collection's natural key; a non-null value there may be held by only
    /// one document.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if another document already holds the
    /// same `key_field` value, or on any other backend uniqueness violation.
    /// Returns [`AppError::Internal`] on backend errors.
    async fn upsert(
        &self,
        collection: &str,
        id: &str,
        key_field: &str,
        document: Value,
    ) -> Result<Upserted, AppError>;

    /// Deletes a document. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on backend errors.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError>;

    /// Checks that the backend is reachable.
    async fn health_check(&self) -> bool;
}
