//! Document store implementations.
//!
//! # Stores
//!
//! - [`PgDocumentStore`] - PostgreSQL JSONB storage via SQLx
//! - [`MemoryStore`] - in-process storage for tests and embedding

pub mod memory_store;
pub mod pg_document_store;

pub use memory_store::MemoryStore;
pub use pg_document_store::PgDocumentStore;
