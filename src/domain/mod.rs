//! Domain layer: auth records, the document model and storage ports.
//!
//! # Architecture
//!
//! - [`entities`] - User, token and API key records
//! - [`document`] - The [`document::Document`] trait, filters and pagination
//! - [`change_event`] - Change notification model
//! - [`repositories`] - Storage ports and the generic [`repositories::Access`] primitive
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Port traits define contracts implemented by the infrastructure layer
//! - Identity, hashing and validation rules live in [`crate::application`]

pub mod change_event;
pub mod document;
pub mod entities;
pub mod repositories;
