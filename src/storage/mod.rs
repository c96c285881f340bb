//! Persistent key-value storage backends.
//!
//! SYSTEM CONTEXT
//! ==============
//! The cart and session never touch a concrete store; they hold a
//! [`SharedStorage`] and speak the browser `localStorage` vocabulary
//! (`get_item`/`set_item`/`remove_item`). Values are always strings; callers
//! own their JSON encoding.
//!
//! CONCURRENCY
//! ===========
//! `compare_and_swap` is the only write primitive that is safe under
//! concurrent read-modify-write. Backends that can serialize access
//! (memory, file) make it atomic; `LocalStorage` runs on the single browser
//! thread and only guards against interleaving within that thread.

pub mod file;
#[cfg(feature = "hydrate")]
pub mod local;
pub mod memory;

use std::sync::Arc;

use thiserror::Error;

pub use file::FileStorage;
#[cfg(feature = "hydrate")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Storage key holding the bearer token string.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the JSON-serialized user record.
pub const USER_KEY: &str = "user";
/// Storage key holding the JSON-serialized cart line items.
pub const CART_KEY: &str = "cart";

#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a JSON object of strings.
    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend refused the operation or is not reachable (e.g. no `window`).
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// String key-value store with `localStorage` semantics.
pub trait Storage: Send + Sync {
    /// Return the value for `key`, or `None` when absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite the value for `key`.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Replace the value for `key` with `new` only if it still equals `current`.
    ///
    /// `None` stands for "absent" on both sides, so `new: None` removes the key.
    /// Returns `false` without writing when the stored value has changed.
    fn compare_and_swap(&self, key: &str, current: Option<&str>, new: Option<&str>) -> Result<bool, StorageError>;
}

/// Storage handle shared by the API client, cart, session, and route guard.
pub type SharedStorage = Arc<dyn Storage>;
