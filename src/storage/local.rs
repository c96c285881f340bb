//! Browser `localStorage` backend (hydrate builds only).

use super::{Storage, StorageError};

/// Zero-sized handle; the `web_sys::Storage` object is looked up per call so
/// the handle stays `Send + Sync`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

fn local_storage() -> Result<web_sys::Storage, StorageError> {
    let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_owned()))?;
    window
        .local_storage()
        .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
        .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_owned()))
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        local_storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
    }

    fn compare_and_swap(&self, key: &str, current: Option<&str>, new: Option<&str>) -> Result<bool, StorageError> {
        let storage = local_storage()?;
        let stored = storage
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?;
        if stored.as_deref() != current {
            return Ok(false);
        }
        match new {
            Some(value) => storage.set_item(key, value),
            None => storage.remove_item(key),
        }
        .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?;
        Ok(true)
    }
}
