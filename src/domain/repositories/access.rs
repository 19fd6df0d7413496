//! Typed CRUD primitive shared by the auth repositories.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::domain::change_event::{ChangeEvent, ChangeKind};
use crate::domain::document::{Document, Filter, Page};
use crate::domain::repositories::{ChangePublisher, DocumentStore, Upserted};
use crate::error::AppError;

/// Typed view of one collection in a [`DocumentStore`].
///
/// Decodes stored JSON into `T`, resolves record identity for upserts and
/// publishes change notifications after successful writes.
pub struct Access<T: Document> {
    store: Arc<dyn DocumentStore>,
    publisher: Arc<dyn ChangePublisher>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> Clone for Access<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            publisher: self.publisher.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> Access<T> {
    pub fn new(store: Arc<dyn DocumentStore>, publisher: Arc<dyn ChangePublisher>) -> Self {
        Self {
            store,
            publisher,
            _marker: PhantomData,
        }
    }

    /// Returns the matching records within `page`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors or undecodable documents.
    pub async fn query(&self, filter: &Filter, page: Page) -> Result<Vec<T>, AppError> {
        self.store
            .find(T::COLLECTION, filter, page)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Returns the first matching record, if any.
    pub async fn first(&self, filter: &Filter) -> Result<Option<T>, AppError> {
        Ok(self.query(filter, Page::first()).await?.into_iter().next())
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64, AppError> {
        self.store.count(T::COLLECTION, filter).await
    }

    /// Fetches a record by its store id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has that id.
    pub async fn get_by_id(&self, id: &str) -> Result<T, AppError> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(document) => decode(document),
            None => Err(AppError::not_found(
                format!("{} with id={} not found.", T::COLLECTION, id),
                json!({ "collection": T::COLLECTION, "id": id }),
            )),
        }
    }

    /// Fetches the record whose `name` field equals `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has that name.
    pub async fn get_by_name(&self, name: &str) -> Result<T, AppError> {
        self.first(&Filter::new().equals("name", name))
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    format!("{} with name={} not found.", T::COLLECTION, name),
                    json!({ "collection": T::COLLECTION, "name": name }),
                )
            })
    }

    /// Inserts `record`, or replaces the stored record with the same identity.
    ///
    /// Identity is the record id when set, otherwise the natural key
    /// ([`Document::KEY_FIELD`]), looked up even when empty. Records matching
    /// neither get a fresh id. If another writer creates the same natural key
    /// between the lookup and the write, the store rejects the fresh id and
    /// the write is retried once against the record that won.
    ///
    /// When `publish` is true a [`ChangeEvent`] is sent after the write; a
    /// failed publish is logged and does not fail the call.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the natural key belongs to another
    /// record, or [`AppError::Internal`] from the store.
    pub async fn add_or_update(&self, mut record: T, publish: bool) -> Result<T, AppError> {
        let upserted = match record.id().filter(|id| !id.is_empty()) {
            Some(id) => {
                let id = id.to_string();
                self.write(&mut record, id).await?
            }
            None => {
                let id = self.existing_id(&record).await?.unwrap_or_else(generate_id);
                match self.write(&mut record, id).await {
                    Err(AppError::Conflict { .. }) => {
                        debug!(
                            "Natural key of {} claimed concurrently, retrying as update",
                            T::COLLECTION
                        );
                        let id = self.existing_id(&record).await?.unwrap_or_else(generate_id);
                        self.write(&mut record, id).await?
                    }
                    other => other?,
                }
            }
        };

        if publish {
            let kind = if upserted.created {
                ChangeKind::Created
            } else {
                ChangeKind::Updated
            };
            if let Some(id) = record.id() {
                self.notify(ChangeEvent::new(T::COLLECTION, id, kind)).await;
            }
        }

        decode(upserted.document)
    }

    async fn write(&self, record: &mut T, id: String) -> Result<Upserted, AppError> {
        record.set_id(id.clone());

        let document = serde_json::to_value(&*record)?;
        let upserted = self
            .store
            .upsert(T::COLLECTION, &id, T::KEY_FIELD, document)
            .await?;
        debug!(
            "Upserted {} id={} (created: {})",
            T::COLLECTION,
            id,
            upserted.created
        );

        Ok(upserted)
    }

    /// Deletes a stored record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the record has no id.
    /// Returns [`AppError::NotFound`] if the store has no such record.
    pub async fn delete(&self, record: &T, publish: bool) -> Result<(), AppError> {
        let Some(id) = record.id().filter(|id| !id.is_empty()) else {
            return Err(AppError::bad_request(
                "Record has no id",
                json!({ "collection": T::COLLECTION }),
            ));
        };

        if !self.store.delete(T::COLLECTION, id).await? {
            return Err(AppError::not_found(
                format!("{} with id={} not found.", T::COLLECTION, id),
                json!({ "collection": T::COLLECTION, "id": id }),
            ));
        }

        if publish {
            self.notify(ChangeEvent::new(T::COLLECTION, id, ChangeKind::Deleted))
                .await;
        }

        Ok(())
    }

    async fn existing_id(&self, record: &T) -> Result<Option<String>, AppError> {
        let key = record.key_value();
        let existing = self.first(&Filter::new().equals(T::KEY_FIELD, key)).await?;
        Ok(existing.and_then(|r| r.id().map(str::to_string)))
    }

    async fn notify(&self, event: ChangeEvent) {
        if let Err(e) = self.publisher.publish(event).await {
            warn!("Failed to publish {} change: {}", T::COLLECTION, e);
        }
    }
}

fn decode<T: Document>(document: Value) -> Result<T, AppError> {
    Ok(serde_json::from_value(document)?)
}

/// 12 random bytes, hex encoded.
fn generate_id() -> String {
    let bytes: [u8; 12] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UserRecord;
    use crate::domain::repositories::change_publisher::{MockChangePublisher, NotifyError};
    use crate::domain::repositories::document_store::{MockDocumentStore, Upserted};

    fn echo_upsert(
        created: bool,
    ) -> impl Fn(&str, &str, &str, Value) -> Result<Upserted, AppError> {
        move |_, id, _, mut document| {
            document["id"] = json!(id);
            Ok(Upserted { document, created })
        }
    }

    fn access(store: MockDocumentStore, publisher: MockChangePublisher) -> Access<UserRecord> {
        Access::new(Arc::new(store), Arc::new(publisher))
    }

    #[tokio::test]
    async fn test_add_new_record_generates_id_and_publishes_created() {
        let mut store = MockDocumentStore::new();
        store.expect_find().times(1).returning(|_, _, _| Ok(vec![]));
        store
            .expect_upsert()
            .withf(|collection, id, key_field, _| {
                collection == "users"
                    && key_field == "name"
                    && id.len() == 24
                    && id.chars().all(|c| c.is_ascii_hexdigit())
            })
            .times(1)
            .returning(echo_upsert(true));

        let mut publisher = MockChangePublisher::new();
        publisher
            .expect_publish()
            .withf(|event| event.collection == "users" && event.kind == ChangeKind::Created)
            .times(1)
            .returning(|_| Ok(()));

        let saved = access(store, publisher)
            .add_or_update(UserRecord::new("alice"), true)
            .await
            .unwrap();

        assert_eq!(saved.name, "alice");
        assert_eq!(saved.id.as_deref().map(str::len), Some(24));
    }

    #[tokio::test]
    async fn test_add_resolves_identity_by_natural_key() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find()
            .withf(|_, filter, _| filter.value_of("name") == Some(&json!("alice")))
            .times(1)
            .returning(|_, _, _| Ok(vec![json!({"id": "existing", "name": "alice"})]));
        store
            .expect_upsert()
            .withf(|_, id, _, _| id == "existing")
            .times(1)
            .returning(echo_upsert(false));

        let mut publisher = MockChangePublisher::new();
        publisher
            .expect_publish()
            .withf(|event| event.id == "existing" && event.kind == ChangeKind::Updated)
            .times(1)
            .returning(|_| Ok(()));

        let saved = access(store, publisher)
            .add_or_update(UserRecord::new("alice").with_nickname("slack", "al"), true)
            .await
            .unwrap();

        assert_eq!(saved.id.as_deref(), Some("existing"));
        assert_eq!(saved.nickname("slack"), Some("al"));
    }

    #[tokio::test]
    async fn test_add_with_id_skips_lookup() {
        let mut store = MockDocumentStore::new();
        store.expect_find().never();
        store
            .expect_upsert()
            .withf(|_, id, _, _| id == "u1")
            .times(1)
            .returning(echo_upsert(false));

        let mut user = UserRecord::new("alice");
        user.id = Some("u1".to_string());

        let saved = access(store, MockChangePublisher::new())
            .add_or_update(user, false)
            .await
            .unwrap();

        assert_eq!(saved.id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_fail_write() {
        let mut store = MockDocumentStore::new();
        store.expect_find().returning(|_, _, _| Ok(vec![]));
        store
            .expect_upsert()
            .times(1)
            .returning(echo_upsert(true));

        let mut publisher = MockChangePublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .returning(|_| Err(NotifyError::PublishError("down".to_string())));

        let result = access(store, publisher)
            .add_or_update(UserRecord::new("alice"), true)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_not_found() {
        let mut store = MockDocumentStore::new();
        store.expect_get().times(1).returning(|_, _| Ok(None));

        let err = access(store, MockChangePublisher::new())
            .get_by_id("nope")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_store_errors_propagate_unchanged() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find()
            .returning(|_, _, _| Err(AppError::internal("Database error", json!({}))));

        let err = access(store, MockChangePublisher::new())
            .get_by_name("alice")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_delete_without_id_is_rejected() {
        let mut store = MockDocumentStore::new();
        store.expect_delete().never();

        let err = access(store, MockChangePublisher::new())
            .delete(&UserRecord::new("alice"), true)
            .await
            .unwrap_err();

        assert!(err.is_invalid_argument());
    }

    #[tokio::test]
    async fn test_lost_create_race_retries_as_update() {
        let mut store = MockDocumentStore::new();
        let mut lookups = 0;
        store.expect_find().times(2).returning(move |_, _, _| {
            lookups += 1;
            if lookups == 1 {
                Ok(vec![])
            } else {
                Ok(vec![json!({"id": "winner", "name": "alice"})])
            }
        });
        store
            .expect_upsert()
            .withf(|_, id, _, _| id != "winner")
            .times(1)
            .returning(|_, _, _, _| Err(AppError::conflict("taken", json!({}))));
        store
            .expect_upsert()
            .withf(|_, id, _, _| id == "winner")
            .times(1)
            .returning(echo_upsert(false));

        let mut publisher = MockChangePublisher::new();
        publisher
            .expect_publish()
            .withf(|event| event.id == "winner" && event.kind == ChangeKind::Updated)
            .times(1)
            .returning(|_| Ok(()));

        let saved = access(store, publisher)
            .add_or_update(UserRecord::new("alice"), true)
            .await
            .unwrap();

        assert_eq!(saved.id.as_deref(), Some("winner"));
    }

    #[tokio::test]
    async fn test_conflict_with_explicit_id_is_returned() {
        let mut store = MockDocumentStore::new();
        store.expect_find().never();
        store
            .expect_upsert()
            .times(1)
            .returning(|_, _, _, _| Err(AppError::conflict("taken", json!({}))));

        let mut user = UserRecord::new("alice");
        user.id = Some("u2".to_string());

        let err = access(store, MockChangePublisher::new())
            .add_or_update(user, false)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_empty_natural_key_is_still_looked_up() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find()
            .withf(|_, filter, _| filter.value_of("name") == Some(&json!("")))
            .times(1)
            .returning(|_, _, _| Ok(vec![json!({"id": "blank", "name": ""})]));
        store
            .expect_upsert()
            .withf(|_, id, _, _| id == "blank")
            .times(1)
            .returning(echo_upsert(false));

        let saved = access(store, MockChangePublisher::new())
            .add_or_update(UserRecord::new(""), false)
            .await
            .unwrap();

        assert_eq!(saved.id.as_deref(), Some("blank"));
    }
}
