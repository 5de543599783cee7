//! In-memory snapshot storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Result};

use super::traits::SnapshotStorage;

/// Snapshot slots kept in a shared map. Clones share the same slots.
///
/// `set_failing(true)` makes every save fail, which lets callers exercise
/// the persistence error path.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
    failing: Arc<Mutex<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with raw text under `key`
    pub fn with_snapshot(key: &str, contents: &str) -> Self {
        let storage = Self::new();
        storage
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), contents.to_string());
        storage
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = failing;
    }

    /// Raw text currently stored under `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load_snapshot(&self, key: &str) -> Result<Option<String>> {
        Ok(self.raw(key))
    }

    fn save_snapshot(&self, key: &str, contents: &str) -> Result<()> {
        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(anyhow!("storage for '{}' is unavailable", key));
        }
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), contents.to_string());
        Ok(())
    }
}
