//! Persistent record storage
//!
//! Provides a `RecordStore` trait that decouples the license client from
//! the host's option storage. Two implementations:
//! - `MemoryStore`: in-memory map (tests, embedding hosts)
//! - `FileStore`: one JSON file per key under a directory

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Key-value storage for structured records.
///
/// Values are opaque JSON; no TTL. Entries live until deleted.
pub trait RecordStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// Reads and decodes a typed record. Undecodable entries read as `None`.
pub fn get_typed<T: DeserializeOwned>(store: &dyn RecordStore, key: &str) -> Result<Option<T>> {
    let Some(value) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_value(value) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            tracing::warn!("Ignoring malformed record under {}: {}", key, e);
            Ok(None)
        }
    }
}

pub fn set_typed<T: Serialize>(store: &dyn RecordStore, key: &str, record: &T) -> Result<()> {
    let value = serde_json::to_value(record).with_context(|| format!("encode record {key}"))?;
    store.set(key, value)
}

/// Store key of the current entitlement record for a slug.
pub fn record_key(slug: &str) -> String {
    format!("__{}_sl_info", slug)
}

/// Store key of the legacy entitlement record for a slug.
pub fn legacy_key(slug: &str) -> String {
    let hash = Sha256::digest(slug.as_bytes());
    format!("legacy_{}_manage_license", hex_encode(&hash[..8]))
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
