//! Infrastructure layer for external integrations.
//!
//! This layer implements the ports defined by the domain layer.
//!
//! # Modules
//!
//! - [`notify`] - Change notification publishers (Redis, in-process, no-op)
//! - [`persistence`] - Document store implementations (PostgreSQL, in-memory)

pub mod notify;
pub mod persistence;
