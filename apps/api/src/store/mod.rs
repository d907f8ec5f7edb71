//! Key-value store capability shared by the collector and the aggregator.
//!
//! The store mirrors a browser's local storage: synchronous, string keys,
//! string values, atomic per key. Components receive it at construction and
//! never reach for a global.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;
use tracing::info;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not a valid key-value document: {0}")]
    Format(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Store handle carried in `AppState`.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Opens the file-backed store when a path is configured, in-memory otherwise.
pub fn open_store(path: Option<&Path>) -> Result<SharedStore> {
    match path {
        Some(path) => {
            let store = FileStore::open(path)?;
            info!("Feedback store opened at {}", path.display());
            Ok(Arc::new(store))
        }
        None => {
            info!("Feedback store is in-memory; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
