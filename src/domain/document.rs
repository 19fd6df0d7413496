//! Document model shared by all collections: the [`Document`] trait, equality
//! filters over JSON paths and pagination windows.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// A record persisted as a JSON document in a named collection.
///
/// Every document has a store-assigned `id` and a natural key field that
/// identifies it when the caller does not know the id (e.g. a user's `name`).
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the document lives in.
    const COLLECTION: &'static str;

    /// Field holding the natural key.
    const KEY_FIELD: &'static str;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// Natural key value. An empty string is matched like any other value.
    fn key_value(&self) -> &str;
}

/// One equality condition: the value at `path` must equal `value`.
///
/// Path segments are kept apart, so a segment containing a dot (an origin such
/// as `chat.example.com`) is still addressed as a single key.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    path: Vec<String>,
    value: Value,
}

impl Condition {
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    fn matches(&self, document: &Value) -> bool {
        let mut current = document;
        for segment in &self.path {
            match current.get(segment) {
                Some(next) => current = next,
                None => return false,
            }
        }
        current == &self.value
    }
}

/// Conjunction of equality conditions. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level field condition.
    pub fn equals(self, field: &str, value: impl Into<Value>) -> Self {
        self.path_equals([field], value)
    }

    /// Adds a condition on a nested field.
    pub fn path_equals<I, S>(mut self, path: I, value: impl Into<Value>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions.push(Condition {
            path: path.into_iter().map(Into::into).collect(),
            value: value.into(),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Whether a document satisfies every condition.
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(document))
    }

    /// Value required for a top-level field, if the filter constrains it.
    pub fn value_of(&self, field: &str) -> Option<&Value> {
        self.conditions
            .iter()
            .find(|c| c.path.len() == 1 && c.path[0] == field)
            .map(|c| &c.value)
    }
}

/// Result window for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: Option<u64>,
}

impl Page {
    /// No offset, no limit.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn first() -> Self {
        Self::limit(1)
    }

    pub fn limit(limit: u64) -> Self {
        Self {
            offset: 0,
            limit: Some(limit),
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}
