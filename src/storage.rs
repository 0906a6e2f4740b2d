// SPDX-License-Identifier: GPL-3.0-only

//! Key-value persistence backends for settings
//!
//! The capture core only needs string get/set/remove. The default backend
//! is [`MemoryStore`], a session-scoped map that lives as long as the process.

use crate::errors::SettingsError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Minimal string key-value persistence
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if absent
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), SettingsError>;
}

/// Session-scoped in-memory store
///
/// Clones share the same map, so a store handed to several components
/// behaves like one browser session storage.
#[derive(Clone, Default, Debug)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Check if the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| SettingsError::Backend(e.to_string()))?;
        debug!(key, bytes = value.len(), "Storing value");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| SettingsError::Backend(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}
