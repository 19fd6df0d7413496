//! Auth records persisted by the repositories.
//!
//! # Entity Types
//!
//! - [`UserRecord`] - A user identity with per-origin nicknames
//! - [`TokenRecord`] - An issued session token
//! - [`ApiKeyRecord`] - An issued API key, stored by digest only
//!
//! All entities implement [`crate::domain::document::Document`] so they can be
//! stored through [`crate::domain::repositories::Access`].

pub mod api_key;
pub mod token;
pub mod user;

pub use api_key::ApiKeyRecord;
pub use token::TokenRecord;
pub use user::UserRecord;
