//! Persistence for the current cart ID.
//!
//! The cart itself always lives remotely; only its ID survives restarts.
//! [`FileCartIdStorage`] keeps it in a small JSON key-value file under
//! [`CART_ID_STORAGE_KEY`], next to whatever other keys the file holds.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use shopfront_core::{CART_ID_STORAGE_KEY, CartId};

use crate::error::StorageError;

/// Synchronous key-value slot holding the current cart ID.
pub trait CartIdStorage: Send + Sync {
    /// Read the persisted cart ID, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self) -> Result<Option<CartId>, StorageError>;

    /// Persist `cart_id`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save(&self, cart_id: &CartId) -> Result<(), StorageError>;

    /// Forget the persisted cart ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// In-memory storage
// =============================================================================

/// Process-local storage, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryCartIdStorage {
    slot: Mutex<Option<CartId>>,
}

impl MemoryCartIdStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that starts out holding `cart_id`.
    #[must_use]
    pub fn with_cart_id(cart_id: impl Into<CartId>) -> Self {
        Self {
            slot: Mutex::new(Some(cart_id.into())),
        }
    }
}

impl CartIdStorage for MemoryCartIdStorage {
    fn load(&self) -> Result<Option<CartId>, StorageError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, cart_id: &CartId) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(cart_id.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// File storage
// =============================================================================

/// JSON file storage.
///
/// Writes go to a sibling temp file and are renamed into place, so a crash
/// mid-write leaves the previous value intact.
#[derive(Debug)]
pub struct FileCartIdStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

type Entries = BTreeMap<String, String>;

impl FileCartIdStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let body = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, body).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl CartIdStorage for FileCartIdStorage {
    fn load(&self) -> Result<Option<CartId>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        Ok(entries.remove(CART_ID_STORAGE_KEY).map(CartId::from))
    }

    fn save(&self, cart_id: &CartId) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        entries.insert(CART_ID_STORAGE_KEY.to_string(), cart_id.to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        if entries.remove(CART_ID_STORAGE_KEY).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryCartIdStorage::new();
        assert!(storage.load().unwrap().is_none());

        storage.save(&CartId::new("gid://cart/1")).unwrap();
        assert_eq!(storage.load().unwrap(), Some(CartId::new("gid://cart/1")));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileCartIdStorage::new(dir.path().join("cart.json"));
        assert!(storage.load().unwrap().is_none());
        storage.clear().unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cart.json");

        FileCartIdStorage::new(&path)
            .save(&CartId::new("gid://cart/7"))
            .unwrap();

        let reopened = FileCartIdStorage::new(&path);
        assert_eq!(reopened.load().unwrap(), Some(CartId::new("gid://cart/7")));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"shopify-cart-id\""));
    }

    #[test]
    fn test_file_storage_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, r#"{"theme":"dark","shopify-cart-id":"gid://cart/1"}"#).unwrap();

        let storage = FileCartIdStorage::new(&path);
        storage.clear().unwrap();

        let entries: Entries =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(entries.get("theme").map(String::as_str), Some("dark"));
        assert!(!entries.contains_key(CART_ID_STORAGE_KEY));
    }

    #[test]
    fn test_file_storage_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileCartIdStorage::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
