//! Device-local key-value persistence.
//!
//! The storefront keeps a small amount of state on the device between runs:
//!
//! - [`keys::CART_ITEMS`] - serialized cart line items
//! - [`keys::ACCESS_TOKEN`] - customer access token
//! - [`keys::TOKEN_EXPIRY`] - token expiry timestamp (ISO-8601)
//!
//! Values are plain strings. There is no schema versioning: a value that
//! fails to deserialize on load is treated as absent, never as a fatal error.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys used by the storefront.
pub mod keys {
    /// Serialized cart line items (JSON array).
    pub const CART_ITEMS: &str = "cart_items";
    /// Customer access token.
    pub const ACCESS_TOKEN: &str = "customer_access_token";
    /// Customer access token expiry (ISO-8601).
    pub const TOKEN_EXPIRY: &str = "customer_token_expiry";
}

/// Errors that can occur when reading or writing device storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key contains characters that cannot be stored.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A string key-value capability.
///
/// Implementations must be cheap to call from async code: values are small
/// and writes are expected to complete quickly.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Load and deserialize a JSON value.
///
/// Read failures and undecodable values both yield `None`; they are logged
/// and the caller starts from an empty state.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored value");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding undecodable stored value");
            None
        }
    }
}

/// Serialize a value as JSON and store it.
///
/// # Errors
///
/// Returns `StorageError` if serialization or the write fails.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip_through_store() {
        let store = MemoryStore::new();
        save_json(&store, "numbers", &vec![1, 2, 3]).unwrap();

        let loaded: Option<Vec<i32>> = load_json(&store, "numbers");
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_load_json_missing_key() {
        let store = MemoryStore::new();
        let loaded: Option<Vec<i32>> = load_json(&store, "absent");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_json_corrupt_value_is_absent() {
        let store = MemoryStore::new();
        store.set("numbers", "{not json").unwrap();

        let loaded: Option<Vec<i32>> = load_json(&store, "numbers");
        assert!(loaded.is_none());
    }
}
