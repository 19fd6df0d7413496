//! User lookups by name and by origin-scoped nickname.

use serde_json::json;
use tracing::warn;

use crate::domain::document::{Filter, Page};
use crate::domain::entities::UserRecord;
use crate::domain::repositories::Access;
use crate::error::AppError;

/// Repository for [`UserRecord`]s.
///
/// Names are unique. Nicknames are expected to be unique per origin, but the
/// store does not enforce it, so [`UserRepository::get_by_nickname`] checks at
/// read time.
#[derive(Clone)]
pub struct UserRepository {
    access: Access<UserRecord>,
}

impl UserRepository {
    pub fn new(access: Access<UserRecord>) -> Self {
        Self { access }
    }

    /// Fetches a user by unique name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no user has that name.
    pub async fn get(&self, name: &str) -> Result<UserRecord, AppError> {
        self.access.get_by_name(name).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<UserRecord, AppError> {
        self.access.get_by_id(id).await
    }

    /// Resolves a user from the nickname they use under `origin`.
    ///
    /// # Errors
    ///
    /// - [`AppError::MissingNamespace`] if `origin` is empty
    /// - [`AppError::NotFound`] if no user has that nickname there
    /// - [`AppError::Ambiguous`] if more than one user does
    pub async fn get_by_nickname(
        &self,
        nickname: &str,
        origin: &str,
    ) -> Result<UserRecord, AppError> {
        if origin.is_empty() {
            return Err(AppError::missing_namespace(
                "Nickname origin is not provided",
                json!({ "nickname": nickname }),
            ));
        }

        let filter = Filter::new().path_equals(["nicknames", origin], nickname);
        let mut matches = self.access.query(&filter, Page::limit(2)).await?;

        match matches.len() {
            0 => Err(AppError::not_found(
                format!(
                    "No user found with nickname \"{}\" for origin \"{}\"",
                    nickname, origin
                ),
                json!({ "nickname": nickname, "origin": origin }),
            )),
            1 => Ok(matches.remove(0)),
            _ => {
                warn!(
                    "Nickname \"{}\" is registered by several users for origin \"{}\"",
                    nickname, origin
                );
                Err(AppError::ambiguous(
                    format!(
                        "Multiple users found with nickname \"{}\" for origin \"{}\"",
                        nickname, origin
                    ),
                    json!({ "nickname": nickname, "origin": origin }),
                ))
            }
        }
    }

    /// Creates or replaces a user, matched by id or else by name.
    pub async fn add_or_update(
        &self,
        user: UserRecord,
        publish: bool,
    ) -> Result<UserRecord, AppError> {
        self.access.add_or_update(user, publish).await
    }
}
