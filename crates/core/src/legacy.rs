//! Read/delete access to records left by the previous licensing provider

use crate::record::{EntitlementRecord, LegacyEntitlementRecord};
use crate::store::{self, RecordStore};
use anyhow::Result;
use std::sync::Arc;

pub struct LegacyEntitlementAdapter {
    store: Arc<dyn RecordStore>,
    key: String,
}

impl LegacyEntitlementAdapter {
    pub fn new(store: Arc<dyn RecordStore>, slug: &str) -> Self {
        Self {
            store,
            key: store::legacy_key(slug),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn read(&self) -> Result<Option<LegacyEntitlementRecord>> {
        store::get_typed(self.store.as_ref(), &self.key)
    }

    /// The legacy license as a current record, when it is active.
    pub fn translated(&self) -> Result<Option<EntitlementRecord>> {
        Ok(self
            .read()?
            .filter(LegacyEntitlementRecord::is_active)
            .map(|legacy| legacy.to_entitlement()))
    }

    pub fn delete(&self) -> Result<()> {
        self.store.delete(&self.key)
    }
}
