//! Entry point for the host application
//!
//! `LicenseFacade` validates the product configuration, wires the
//! entitlement client into the registry and answers the one question the
//! rest of the product cares about: is the license valid?

use crate::client::EntitlementClient;
use crate::config::LicenseConfig;
use crate::endpoint::EndpointController;
use crate::error::{LicenseError, Result};
use crate::events::{EventSink, TracingEvents};
use crate::host::{CapabilityCheck, TokenGuard};
use crate::record::EntitlementRecord;
use crate::registry::LicenseRegistry;
use crate::store::RecordStore;
use crate::transport::Transport;
use serde::Serialize;
use std::sync::Arc;

/// Link shown next to the product in a plugin list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionLink {
    pub label: String,
    pub url: String,
}

/// Summary for display.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseInfo {
    pub is_valid: bool,
    pub plugin_name: String,
    pub plugin_version: String,
    pub license_data: serde_json::Value,
}

pub struct LicenseFacade {
    config: LicenseConfig,
    store: Arc<dyn RecordStore>,
    transport: Arc<dyn Transport>,
    events: Arc<dyn EventSink>,
    client: Option<Arc<EntitlementClient>>,
    is_valid: bool,
    data: EntitlementRecord,
}

impl LicenseFacade {
    /// Fails with `LicenseError::Configuration` naming the first missing field.
    pub fn new(
        config: LicenseConfig,
        store: Arc<dyn RecordStore>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            transport,
            events: Arc::new(TracingEvents),
            client: None,
            is_valid: false,
            data: EntitlementRecord::unregistered(),
        })
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Builds (or reuses) the slug's client and reads the cached status.
    ///
    /// Cache-only: no network I/O happens here.
    pub fn connect(&mut self, registry: &mut LicenseRegistry) -> Result<Arc<EntitlementClient>> {
        let client = match registry.get(&self.config.slug()) {
            Ok(existing) => existing,
            Err(_) => {
                let client = EntitlementClient::new(
                    &self.config,
                    Arc::clone(&self.store),
                    Arc::clone(&self.transport),
                )?
                .with_events(Arc::clone(&self.events));
                registry.register(client)
            }
        };

        let status = client.get_status(false)?;
        self.is_valid = status.is_valid();
        self.data = status;
        tracing::debug!(
            slug = %client.slug(),
            valid = self.is_valid,
            "license facade connected"
        );

        self.client = Some(Arc::clone(&client));
        Ok(client)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Record read at connect time.
    pub fn get_data(&self) -> &EntitlementRecord {
        &self.data
    }

    pub fn config(&self) -> &LicenseConfig {
        &self.config
    }

    pub fn client(&self) -> Result<Arc<EntitlementClient>> {
        self.client
            .clone()
            .ok_or_else(|| LicenseError::NotRegistered(self.config.slug()))
    }

    /// Endpoint controller for the connected client.
    pub fn controller(
        &self,
        capability: Arc<dyn CapabilityCheck>,
        tokens: Arc<dyn TokenGuard>,
    ) -> Result<EndpointController> {
        Ok(EndpointController::new(self.client()?, capability, tokens))
    }

    pub fn license_info(&self) -> LicenseInfo {
        LicenseInfo {
            is_valid: self.is_valid,
            plugin_name: self.config.plugin_name.clone(),
            plugin_version: self.config.plugin_version.clone(),
            license_data: crate::endpoint::public_view(&self.data),
        }
    }

    /// Post-activation and post-deactivation redirect targets. Deactivation
    /// falls back to the activation target when unset.
    pub fn redirect_urls(&self) -> (&str, &str) {
        (
            &self.config.activate_redirect_url,
            self.config.deactivate_redirect(),
        )
    }

    /// "Activate License" or "Manage License", pointing at the license page.
    /// `None` when the config hides the link.
    pub fn action_link(&self) -> Option<ActionLink> {
        if !self.config.show_action_link {
            return None;
        }
        let verb = if self.is_valid { "Manage" } else { "Activate" };
        Some(ActionLink {
            label: format!("{verb} License"),
            url: format!("admin.php?page={}", self.config.menu_slug()),
        })
    }
}
