//! Session record: bearer token plus the signed-in user's record.
//!
//! SYSTEM CONTEXT
//! ==============
//! The API client reads the token on every request; the route guard reads
//! both keys before every navigation. Nothing here talks to the backend, so
//! token presence alone means "signed in" until a request says otherwise.

use serde_json::Value;
use thiserror::Error;

use crate::net::types::User;
use crate::storage::{SharedStorage, StorageError, TOKEN_KEY, USER_KEY};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The `user` key holds something that is not a JSON user record.
    #[error("stored user record is corrupt: {0}")]
    CorruptUser(#[source] serde_json::Error),

    #[error("user record encode failed: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Clone)]
pub struct Session {
    storage: SharedStorage,
}

impl Session {
    #[must_use]
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    /// Stored bearer token. An empty string counts as no token.
    ///
    /// # Errors
    ///
    /// Propagates storage read failures.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.storage.get_item(TOKEN_KEY)?.filter(|token| !token.is_empty()))
    }

    /// # Errors
    ///
    /// Propagates storage write failures.
    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set_item(TOKEN_KEY, token)
    }

    /// # Errors
    ///
    /// Propagates storage read failures.
    pub fn is_authenticated(&self) -> Result<bool, StorageError> {
        Ok(self.token()?.is_some())
    }

    /// Full user record, decoded.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CorruptUser`] if the record is not a valid
    /// user object.
    pub fn user(&self) -> Result<Option<User>, SessionError> {
        let Some(raw) = self.storage.get_item(USER_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(SessionError::CorruptUser)
    }

    /// Superuser flag of the stored user record; `None` when no record exists.
    ///
    /// Only the flag is read, so a partial record still answers. A missing or
    /// non-boolean flag reads as `false`: only a JSON `true` grants admin, and
    /// merely truthy values such as `1` or `"yes"` do not.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CorruptUser`] if the record is not JSON at all.
    pub fn superuser_flag(&self) -> Result<Option<bool>, SessionError> {
        let Some(raw) = self.storage.get_item(USER_KEY)? else {
            return Ok(None);
        };
        let record: Value = serde_json::from_str(&raw).map_err(SessionError::CorruptUser)?;
        Ok(Some(record.get("is_superuser").and_then(Value::as_bool).unwrap_or(false)))
    }

    /// # Errors
    ///
    /// Propagates encode and storage write failures.
    pub fn set_user(&self, user: &User) -> Result<(), SessionError> {
        let raw = serde_json::to_string(user).map_err(SessionError::Encode)?;
        self.storage.set_item(USER_KEY, &raw)?;
        Ok(())
    }

    /// Persist a freshly issued token and the user it belongs to.
    ///
    /// # Errors
    ///
    /// Propagates encode and storage write failures.
    pub fn store(&self, token: &str, user: &User) -> Result<(), SessionError> {
        self.set_token(token)?;
        self.set_user(user)
    }

    /// Forget token and user. The cart key is left alone.
    ///
    /// # Errors
    ///
    /// Propagates storage write failures.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(TOKEN_KEY)?;
        self.storage.remove_item(USER_KEY)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
