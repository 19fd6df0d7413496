//! # Auth Store
//!
//! Access layer for authentication records (users, session tokens and API
//! keys) kept in a document store.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Records, the document model and storage ports
//! - **Application Layer** ([`application`]) - The user, token and API key repositories
//! - **Infrastructure Layer** ([`infrastructure`]) - PostgreSQL and in-memory stores, notification publishers
//!
//! ## Features
//!
//! - User lookup by name or by nickname scoped to an origin, with ambiguity detection
//! - Token writes refused unless owner, value and expiry are set
//! - API key lookup by digest only, with paging limits read from live settings
//! - Change notifications over Redis pub/sub or in-process broadcast
//!
//! ## Quick Start
//!
//! ```ignore
//! let auth = AuthStore::in_memory();
//! auth.users
//!     .add_or_update(UserRecord::new("alice").with_nickname("slack", "al"), true)
//!     .await?;
//! let alice = auth.users.get_by_nickname("al", "slack").await?;
//! ```
//!
//! ## Configuration
//!
//! Deployments backed by PostgreSQL load settings via [`config::Config`] and
//! connect with [`AuthStore::connect`].

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use error::AppError;
pub use state::AuthStore;

/// Commonly used types for external consumers.
pub mod prelude {
    pub use crate::application::{ApiKeyRepository, TokenRepository, UserRepository};
    pub use crate::config::{Config, DynamicSettings, SettingsProvider};
    pub use crate::domain::change_event::{ChangeEvent, ChangeKind};
    pub use crate::domain::entities::{ApiKeyRecord, TokenRecord, UserRecord};
    pub use crate::error::AppError;
    pub use crate::state::AuthStore;
    pub use crate::utils::KeyHasher;
}
