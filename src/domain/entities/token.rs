//! Session token record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::document::Document;

/// An issued session token.
///
/// `user`, `token` and `expiry` must all be set before the record may be
/// written; an empty string counts as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owner's user name.
    #[serde(default)]
    pub user: String,
    /// Opaque secret value.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub service: bool,
}

impl TokenRecord {
    pub fn new(user: impl Into<String>, token: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            user: user.into(),
            token: token.into(),
            expiry: Some(expiry),
            ..Self::default()
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }
}

impl Document for TokenRecord {
    const COLLECTION: &'static str = "tokens";
    const KEY_FIELD: &'static str = "token";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn key_value(&self) -> &str {
        &self.token
    }
}
