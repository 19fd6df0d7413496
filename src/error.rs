//! Error taxonomy shared by every repository and store.
//!
//! Each variant carries a human-readable message and a JSON `details` payload
//! with diagnostic context (offending value, digest, limit). Raw secrets never
//! appear in either.

use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Caller supplied missing, out-of-range or malformed input.
    #[error("{message}")]
    Validation { message: String, details: Value },
    /// Nickname lookup without an origin namespace.
    #[error("{message}")]
    MissingNamespace { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    /// A uniqueness invariant the store does not enforce was violated.
    #[error("{message}")]
    Ambiguous { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn missing_namespace(message: impl Into<String>, details: Value) -> Self {
        Self::MissingNamespace {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn ambiguous(message: impl Into<String>, details: Value) -> Self {
        Self::Ambiguous {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for [`AppError::Validation`] and its [`AppError::MissingNamespace`] specialization.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::MissingNamespace { .. }
        )
    }

    /// Stable machine-readable code for logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "invalid_argument",
            Self::MissingNamespace { .. } => "missing_namespace",
            Self::NotFound { .. } => "not_found",
            Self::Ambiguous { .. } => "ambiguous",
            Self::Conflict { .. } => "conflict",
            Self::Internal { .. } => "internal_error",
        }
    }

    pub fn details(&self) -> &Value {
        match self {
            Self::Validation { details, .. }
            | Self::MissingNamespace { details, .. }
            | Self::NotFound { details, .. }
            | Self::Ambiguous { details, .. }
            | Self::Conflict { details, .. }
            | Self::Internal { details, .. } => details,
        }
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return AppError::conflict(
            "Unique constraint violation",
            json!({ "constraint": db.constraint() }),
        );
    }

    AppError::internal("Database error", json!({ "reason": e.to_string() }))
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::internal("Migration failed", json!({ "reason": e.to_string() }))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::internal("Malformed document", json!({ "reason": e.to_string() }))
    }
}
