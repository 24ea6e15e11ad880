//! Per-slug client registry
//!
//! Several products can share one process; each slug gets exactly one
//! `EntitlementClient`. The process owner holds the registry and hands out
//! references.

use crate::client::EntitlementClient;
use crate::error::{LicenseError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
pub struct LicenseRegistry {
    clients: BTreeMap<String, Arc<EntitlementClient>>,
}

impl LicenseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client under its slug. If the slug is already known the
    /// existing instance is kept and returned.
    pub fn register(&mut self, client: EntitlementClient) -> Arc<EntitlementClient> {
        let slug = client.slug().to_string();
        Arc::clone(
            self.clients
                .entry(slug)
                .or_insert_with(|| Arc::new(client)),
        )
    }

    pub fn get(&self, slug: &str) -> Result<Arc<EntitlementClient>> {
        self.clients
            .get(slug)
            .cloned()
            .ok_or_else(|| LicenseError::NotRegistered(slug.to_string()))
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.clients.contains_key(slug)
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
