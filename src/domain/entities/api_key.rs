//! API key record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::document::Document;

/// An issued API key.
///
/// Only the digest of the raw key is kept (`key_hash`). The raw secret is shown
/// to its owner once at issuance and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub user: String,
    pub key_hash: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ApiKeyRecord {
    /// Creates an enabled key for `user` from an already computed digest.
    pub fn new(user: impl Into<String>, key_hash: impl Into<String>) -> Self {
        let key_hash = key_hash.into();
        Self {
            id: None,
            uid: format!("api_key:{key_hash}"),
            user: user.into(),
            key_hash,
            metadata: Map::new(),
            created_at: Utc::now(),
            enabled: true,
        }
    }
}

impl Document for ApiKeyRecord {
    const COLLECTION: &'static str = "api_keys";
    const KEY_FIELD: &'static str = "key_hash";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn key_value(&self) -> &str {
        &self.key_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_api_key_defaults() {
        let key = ApiKeyRecord::new("alice", "deadbeef");

        assert!(key.enabled);
        assert!(key.id.is_none());
        assert_eq!(key.uid, "api_key:deadbeef");
        assert_eq!(key.key_value(), "deadbeef");
    }

    #[test]
    fn test_enabled_defaults_to_true_when_absent() {
        let key: ApiKeyRecord = serde_json::from_str(
            r#"{"key_hash": "abc", "created_at": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert!(key.enabled);
        assert!(key.user.is_empty());
    }
}
