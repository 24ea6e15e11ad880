//! File-backed record store: one pretty-printed JSON file per key

use super::RecordStore;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

/// Reversible file name for a key: `[A-Za-z0-9.-]` pass through, every
/// other byte (including `_`) becomes `_xx` lowercase hex.
fn file_stem(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'.' {
            name.push(b as char);
        } else {
            name.push_str(&format!("_{b:02x}"));
        }
    }
    name
}

impl RecordStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("read record {}", path.display()))?;
        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("Unreadable record file {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create store dir {}", self.dir.display()))?;
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(&value)?;
        std::fs::write(&path, json).with_context(|| format!("write record {}", path.display()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove record {}", path.display())),
        }
    }
}
