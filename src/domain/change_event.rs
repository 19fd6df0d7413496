//! Change notification model emitted after successful writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A notification that a document in a collection changed.
///
/// Carries identifiers only, never the document body, so secrets such as
/// token values stay out of the notification channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub collection: String,
    pub id: String,
    pub kind: ChangeKind,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(collection: &str, id: &str, kind: ChangeKind) -> Self {
        Self {
            collection: collection.to_string(),
            id: id.to_string(),
            kind,
            at: Utc::now(),
        }
    }
}
