//! API key lookups by raw key (hashed first) or by record id.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::config::SettingsProvider;
use crate::domain::document::{Filter, Page};
use crate::domain::entities::ApiKeyRecord;
use crate::domain::repositories::Access;
use crate::error::AppError;
use crate::utils::KeyHasher;

/// Number of items returned per page if no limit is given.
pub const DEFAULT_LIMIT: i64 = 100;

/// Conversion of a caller-supplied offset into an integer.
///
/// Offsets often arrive as query-string text; text that does not parse as an
/// integer is rejected with [`AppError::Validation`].
pub trait IntoOffset {
    fn into_offset(self) -> Result<i64, AppError>;
}

impl IntoOffset for i64 {
    fn into_offset(self) -> Result<i64, AppError> {
        Ok(self)
    }
}

impl IntoOffset for i32 {
    fn into_offset(self) -> Result<i64, AppError> {
        Ok(self.into())
    }
}

impl IntoOffset for u64 {
    fn into_offset(self) -> Result<i64, AppError> {
        i64::try_from(self)
            .map_err(|_| AppError::bad_request("Offset is too large", json!({ "offset": self })))
    }
}

impl IntoOffset for &str {
    fn into_offset(self) -> Result<i64, AppError> {
        self.trim().parse().map_err(|_| {
            AppError::bad_request(
                format!("Offset \"{}\" is not an integer", self),
                json!({ "offset": self }),
            )
        })
    }
}

impl IntoOffset for String {
    fn into_offset(self) -> Result<i64, AppError> {
        self.as_str().into_offset()
    }
}

/// Repository for [`ApiKeyRecord`]s.
///
/// The store holds only key digests; every lookup by raw key hashes first and
/// never sends the raw value to the store or into an error.
#[derive(Clone)]
pub struct ApiKeyRepository {
    access: Access<ApiKeyRecord>,
    hasher: Arc<dyn KeyHasher>,
    settings: Arc<dyn SettingsProvider>,
}

impl ApiKeyRepository {
    pub fn new(
        access: Access<ApiKeyRecord>,
        hasher: Arc<dyn KeyHasher>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            access,
            hasher,
            settings,
        }
    }

    /// Maximum `limit` a caller may request, read from settings on every call.
    pub fn max_limit(&self) -> i64 {
        self.settings.max_page_size()
    }

    /// Digest used to store and look up `raw`.
    pub fn hash_key(&self, raw: &str) -> String {
        self.hasher.hash(raw)
    }

    /// Fetches the key whose digest matches the raw key `value`.
    ///
    /// `offset` is validated but does not shift the lookup: key digests are
    /// unique. The store is asked for a single row only when `limit` is
    /// exactly `1`.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `offset` is not an integer or `limit`
    ///   exceeds [`ApiKeyRepository::max_limit`]
    /// - [`AppError::NotFound`] if no key has that digest
    pub async fn get(
        &self,
        value: &str,
        limit: Option<i64>,
        offset: impl IntoOffset,
    ) -> Result<ApiKeyRecord, AppError> {
        let value_hash = self.hash_key(value);

        let _offset = offset.into_offset()?;

        if let Some(limit) = limit {
            let max_limit = self.max_limit();
            if limit > max_limit {
                return Err(AppError::bad_request(
                    format!(
                        "Limit \"{}\" specified, maximum value is \"{}\"",
                        limit, max_limit
                    ),
                    json!({ "limit": limit, "max_limit": max_limit }),
                ));
            }
        }

        let page = if limit == Some(1) {
            Page::first()
        } else {
            Page::all()
        };

        let filter = Filter::new().equals("key_hash", value_hash.as_str());
        self.access
            .query(&filter, page)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::not_found(
                    format!("ApiKey with key_hash={} not found.", value_hash),
                    json!({ "key_hash": value_hash }),
                )
            })
    }

    pub async fn get_by_id(&self, id: &str) -> Result<ApiKeyRecord, AppError> {
        self.access.get_by_id(id).await
    }

    /// Fetches a key by raw key value, falling back to record id.
    ///
    /// Only a `NotFound` from the raw-key lookup triggers the fallback; any
    /// other error is returned as is. Any failure of the id lookup becomes
    /// `NotFound`.
    pub async fn get_by_key_or_id(&self, value: &str) -> Result<ApiKeyRecord, AppError> {
        match self.get(value, None, 0).await {
            Ok(key) => return Ok(key),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        self.get_by_id(value).await.map_err(|e| {
            debug!("ApiKey id lookup failed: {}", e);
            AppError::not_found("ApiKey with key or id not found.", json!({}))
        })
    }

    /// Lists keys, [`DEFAULT_LIMIT`] per page unless `limit` says otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `limit` is not positive or exceeds
    /// [`ApiKeyRepository::max_limit`], or if `offset` is negative or not an integer.
    pub async fn list(
        &self,
        limit: Option<i64>,
        offset: impl IntoOffset,
    ) -> Result<Vec<ApiKeyRecord>, AppError> {
        let offset = offset.into_offset()?;
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        let max_limit = self.max_limit();

        if limit < 1 || limit > max_limit {
            return Err(AppError::bad_request(
                format!(
                    "Limit \"{}\" specified, must be between 1 and \"{}\"",
                    limit, max_limit
                ),
                json!({ "limit": limit, "max_limit": max_limit }),
            ));
        }

        let offset = u64::try_from(offset).map_err(|_| {
            AppError::bad_request("Offset must not be negative", json!({ "offset": offset }))
        })?;

        self.access
            .query(&Filter::new(), Page::limit(limit as u64).with_offset(offset))
            .await
    }

    /// Creates or replaces a key record, matched by id or else by digest.
    pub async fn add_or_update(
        &self,
        key: ApiKeyRecord,
        publish: bool,
    ) -> Result<ApiKeyRecord, AppError> {
        self.access.add_or_update(key, publish).await
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        self.access.count(&Filter::new()).await
    }
}
