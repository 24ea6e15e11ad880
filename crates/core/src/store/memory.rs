//! In-memory record store

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use serde_json::Value;

use super::RecordStore;

/// In-memory record store backed by `HashMap<String, Value>`
pub struct MemoryStore {
    records: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create a new empty MemoryStore
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records
            .read()
            .map(|r| r.contains_key(key))
            .unwrap_or(false)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow::anyhow!("lock poisoned: {e}"))?;
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow::anyhow!("lock poisoned: {e}"))?;
        records.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow::anyhow!("lock poisoned: {e}"))?;
        records.remove(key);
        Ok(())
    }
}
