//! In-process document store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::domain::document::{Filter, Page};
use crate::domain::repositories::{DocumentStore, Upserted};
use crate::error::AppError;

/// Document store kept in memory, for tests and embedded use.
///
/// Documents keep insertion order; a replaced document keeps its position.
/// Writes take an exclusive lock, so an upsert, including its natural-key
/// uniqueness check, is atomic.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn has_id(document: &Value, id: &str) -> bool {
    document.get("id").and_then(Value::as_str) == Some(id)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        page: Page,
    ) -> Result<Vec<Value>, AppError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let matching = documents
            .iter()
            .filter(|d| filter.matches(d))
            .skip(page.offset as usize);

        Ok(match page.limit {
            Some(limit) => matching.take(limit as usize).cloned().collect(),
            None => matching.cloned().collect(),
        })
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| has_id(d, id)))
            .cloned())
    }

    async fn upsert(
        &self,
        collection: &str,
        id: &str,
        key_field: &str,
        mut document: Value,
    ) -> Result<Upserted, AppError> {
        let Some(fields) = document.as_object_mut() else {
            return Err(AppError::internal(
                "Document must be a JSON object",
                json!({ "collection": collection, "id": id }),
            ));
        };
        fields.insert("id".to_string(), Value::String(id.to_string()));

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if let Some(key) = document.get(key_field).filter(|v| !v.is_null())
            && documents
                .iter()
                .any(|d| d.get(key_field) == Some(key) && !has_id(d, id))
        {
            return Err(AppError::conflict(
                format!("{} with this {} already exists", collection, key_field),
                json!({ "collection": collection, "key_field": key_field }),
            ));
        }

        let created = match documents.iter_mut().find(|d| has_id(d, id)) {
            Some(existing) => {
                *existing = document.clone();
                false
            }
            None => {
                documents.push(document.clone());
                true
            }
        };

        Ok(Upserted { document, created })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let before = documents.len();
        documents.retain(|d| !has_id(d, id));
        Ok(documents.len() < before)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
