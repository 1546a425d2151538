//! Local key-value store.
//!
//! Client state is kept as string values under string keys, with JSON
//! helpers on top.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local, used by tests and throwaway sessions
//! - [`FileStore`] - a single JSON document on disk, rewritten on every change
//!
//! Values are always written whole. There is no partial update, no
//! transaction, and no coordination between processes sharing a file: the
//! last writer wins.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Keys used by the client.
pub mod keys {
    /// JSON user record of the logged-in user.
    pub const CURRENT_USER: &str = "currentUser";

    /// Bearer token of the logged-in user, stored as a raw string.
    pub const TOKEN: &str = "token";

    /// JSON array of cart line items.
    pub const CART: &str = "cart";
}

/// A string-to-string key-value store.
///
/// Implementations use interior mutability so a single store can be shared
/// by the cart and the auth session.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Shared handle to a [`KeyValueStore`] with JSON helpers.
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore").finish_non_exhaustive()
    }
}

impl PersistentStore {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// A fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }

    /// Read a raw string value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.backend.get(key)
    }

    /// Write a raw string value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    pub fn set_raw(&self, key: &str, value: impl Into<String>) -> Result<(), StoreError> {
        self.backend.set(key, value.into())
    }

    /// Read and deserialize a JSON value.
    ///
    /// A JSON `null` is treated like a missing key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Corrupt` if the stored text does not parse as `T`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str::<Option<T>>(&raw).map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        })
    }

    /// Serialize and write a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if serialization or the write fails.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, raw)
    }

    /// Remove a key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.backend.remove(key)
    }
}
