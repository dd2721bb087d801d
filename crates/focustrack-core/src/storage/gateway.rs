//! The persistence gateway: a string key-value store.
//!
//! The engine needs nothing beyond get/set/remove on three logical keys.
//! Values are JSON documents.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::StorageError;

/// Logical keys the engine reads and writes.
pub mod keys {
    pub const SETTINGS: &str = "settings";
    pub const STATS: &str = "stats";
    pub const CURRENT_SESSION: &str = "current_session";

    pub const ALL: [&str; 3] = [SETTINGS, STATS, CURRENT_SESSION];
}

/// Durable string storage keyed by logical name.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-process store.
///
/// Clones share the same map, so a test can hand one clone to an engine,
/// drop the engine and open a new one on the other clone to simulate a
/// restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Read and decode `key`, or `None` when it is absent or unreadable.
///
/// Read and decode failures are logged, never returned: a broken document
/// is treated the same as a missing one.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read from store");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding undecodable document");
            None
        }
    }
}

/// Encode and write `value` under `key`, logging instead of failing.
pub fn save_json<T: Serialize + ?Sized>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            warn!(key, error = %e, "failed to encode document");
            return;
        }
    };
    if let Err(e) = store.set(key, &json) {
        warn!(key, error = %e, "failed to write to store");
    }
}

/// Remove `key`, logging instead of failing.
pub fn remove_key(store: &mut dyn KeyValueStore, key: &str) {
    if let Err(e) = store.remove(key) {
        warn!(key, error = %e, "failed to remove from store");
    }
}
