//! Session token persistence with completeness checks.

use serde_json::json;

use crate::domain::document::Filter;
use crate::domain::entities::TokenRecord;
use crate::domain::repositories::Access;
use crate::error::AppError;

/// Repository for [`TokenRecord`]s.
///
/// Writes are refused unless owner, value and expiry are all set. Token values
/// are secrets and are never echoed into errors.
#[derive(Clone)]
pub struct TokenRepository {
    access: Access<TokenRecord>,
}

impl TokenRepository {
    pub fn new(access: Access<TokenRecord>) -> Self {
        Self { access }
    }

    /// Creates or replaces a token and, if `publish` is set, announces the change.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for the first missing field, checked in
    /// the order owner, value, expiry. Nothing is written in that case.
    pub async fn add_or_update(
        &self,
        token: TokenRecord,
        publish: bool,
    ) -> Result<TokenRecord, AppError> {
        validate(&token)?;
        self.access.add_or_update(token, publish).await
    }

    /// [`TokenRepository::add_or_update`] with notifications enabled.
    pub async fn add_or_update_default(&self, token: TokenRecord) -> Result<TokenRecord, AppError> {
        self.add_or_update(token, true).await
    }

    /// Fetches the token with exactly this value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no token has that value.
    pub async fn get(&self, value: &str) -> Result<TokenRecord, AppError> {
        self.access
            .first(&Filter::new().equals("token", value))
            .await?
            .ok_or_else(|| AppError::not_found("Token not found.", json!({})))
    }

    pub async fn delete(&self, token: &TokenRecord, publish: bool) -> Result<(), AppError> {
        self.access.delete(token, publish).await
    }
}

fn validate(token: &TokenRecord) -> Result<(), AppError> {
    if token.user.is_empty() {
        return Err(AppError::bad_request(
            "User is not provided in the token.",
            json!({ "field": "user" }),
        ));
    }
    if token.token.is_empty() {
        return Err(AppError::bad_request(
            "Token value is not set.",
            json!({ "field": "token" }),
        ));
    }
    if token.expiry.is_none() {
        return Err(AppError::bad_request(
            "Token expiry is not provided in the token.",
            json!({ "field": "expiry" }),
        ));
    }
    Ok(())
}
