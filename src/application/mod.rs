//! Application layer: the auth repositories.
//!
//! Each repository wraps one collection's [`crate::domain::repositories::Access`]
//! and applies the rules specific to its records.
//!
//! - [`UserRepository`] - name and origin-scoped nickname resolution
//! - [`TokenRepository`] - token completeness checks before writes
//! - [`ApiKeyRepository`] - digest-only key lookup, paging limits, key-or-id fallback

pub mod api_key_repository;
pub mod token_repository;
pub mod user_repository;

pub use api_key_repository::{ApiKeyRepository, DEFAULT_LIMIT, IntoOffset};
pub use token_repository::TokenRepository;
pub use user_repository::UserRepository;
