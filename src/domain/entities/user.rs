//! User record: unique name plus per-origin nicknames.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::document::Document;

/// A user identity.
///
/// `name` is globally unique. `nicknames` maps an origin namespace (e.g. a chat
/// platform) to the alternate name the user goes by there; at most one
/// nickname per origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_service: bool,
    #[serde(default)]
    pub nicknames: BTreeMap<String, String>,
}

impl UserRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Registers a nickname under `origin`, replacing any previous one there.
    pub fn with_nickname(mut self, origin: impl Into<String>, nickname: impl Into<String>) -> Self {
        self.nicknames.insert(origin.into(), nickname.into());
        self
    }

    pub fn nickname(&self, origin: &str) -> Option<&str> {
        self.nicknames.get(origin).map(String::as_str)
    }
}

impl Document for UserRecord {
    const COLLECTION: &'static str = "users";
    const KEY_FIELD: &'static str = "name";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn key_value(&self) -> &str {
        &self.name
    }
}
