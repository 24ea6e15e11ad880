//! Entitlement API client: activation, deactivation and status checks
//!
//! The client owns the cached `EntitlementRecord` for its slug. Nothing else
//! writes that store entry.
//!
//! Every operation performs at most one outbound request and never retries;
//! a record is only persisted after a fully decoded success response.

use crate::config::LicenseConfig;
use crate::error::{LicenseError, Result};
use crate::events::{EventSink, LicenseEvent, TracingEvents};
use crate::legacy::LegacyEntitlementAdapter;
use crate::record::{mask_key, scalar_to_string, EntitlementRecord, LicenseStatus};
use crate::store::{self, RecordStore};
use crate::transport::Transport;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Query parameter carrying the action discriminator.
const ACTION_PARAM: &str = "fluent-cart";

pub const ACTION_ACTIVATE: &str = "activate_license";
pub const ACTION_DEACTIVATE: &str = "deactivate_license";
pub const ACTION_CHECK: &str = "check_license";

const EMPTY_RESPONSE: &str = "API request returned an empty or not JSON response.";

/// Outcome of a deactivation. The local record is gone either way.
#[derive(Debug, Clone, PartialEq)]
pub struct Deactivation {
    /// Whether the remote service confirmed the deactivation
    pub remote_deactivated: bool,
    /// Why the remote call failed, when it did
    pub remote_error: Option<String>,
}

pub struct EntitlementClient {
    slug: String,
    item_id: String,
    version: String,
    api_url: Url,
    site_url: String,
    timeout: Duration,
    record_key: String,
    store: Arc<dyn RecordStore>,
    legacy: LegacyEntitlementAdapter,
    transport: Arc<dyn Transport>,
    events: Arc<dyn EventSink>,
}

impl EntitlementClient {
    /// Builds a client for the configured product.
    ///
    /// Fails with `LicenseError::Configuration` when a required field is
    /// missing or the API URL does not parse.
    pub fn new(
        config: &LicenseConfig,
        store: Arc<dyn RecordStore>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;
        let slug = config.slug();
        let api_url = Url::parse(config.api_url.trim())
            .map_err(|_| LicenseError::Configuration { field: "api_url" })?;

        Ok(Self {
            record_key: store::record_key(&slug),
            legacy: LegacyEntitlementAdapter::new(Arc::clone(&store), &slug),
            slug,
            item_id: config.item_id.trim().to_string(),
            version: config.plugin_version.trim().to_string(),
            api_url,
            site_url: config.site_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            store,
            transport,
            events: Arc::new(TracingEvents),
        })
    }

    /// Replaces the default (logging) event sink.
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Activates `license_key` for this site and caches the result.
    ///
    /// A successful activation fully replaces any cached record.
    pub fn activate(&self, license_key: &str) -> Result<EntitlementRecord> {
        let license_key = license_key.trim();
        if license_key.is_empty() {
            return Err(LicenseError::Validation(
                "License key is required for activation.".to_string(),
            ));
        }

        let response = self.api_request(
            ACTION_ACTIVATE,
            vec![("license_key", license_key.to_string())],
        )?;

        let record = EntitlementRecord {
            license_key: license_key.to_string(),
            status: LicenseStatus::new(
                field_str(&response, "status").unwrap_or_else(|| LicenseStatus::VALID.into()),
            ),
            variation_id: field_str(&response, "variation_id").unwrap_or_default(),
            variation_title: field_str(&response, "variation_title").unwrap_or_default(),
            expires: field_str(&response, "expiration_date").unwrap_or_default(),
            activation_hash: field_str(&response, "activation_hash").unwrap_or_default(),
            ..EntitlementRecord::default()
        };

        store::set_typed(self.store.as_ref(), &self.record_key, &record)?;
        tracing::info!(
            slug = %self.slug,
            key = %mask_key(license_key),
            status = %record.status,
            "activation stored"
        );

        self.events.emit(&LicenseEvent::Activated {
            slug: self.slug.clone(),
            record: record.clone(),
        });

        Ok(record)
    }

    /// Releases the activation. Local invalidation always wins: the cached
    /// and legacy records are deleted whatever the remote call returned.
    pub fn deactivate(&self) -> Result<Deactivation> {
        let current = self.local_status().unwrap_or_else(|e| {
            tracing::warn!("Could not read cached license before deactivation: {}", e);
            EntitlementRecord::unregistered()
        });

        let remote = self.api_request(
            ACTION_DEACTIVATE,
            vec![
                ("license_key", current.license_key.clone()),
                ("activation_hash", current.activation_hash.clone()),
            ],
        );

        let outcome = match remote {
            Ok(_) => Deactivation {
                remote_deactivated: true,
                remote_error: None,
            },
            Err(e) => {
                tracing::warn!(slug = %self.slug, "Remote deactivation failed: {}", e);
                Deactivation {
                    remote_deactivated: false,
                    remote_error: Some(e.to_string()),
                }
            }
        };

        let local = self.store.delete(&self.record_key);
        let legacy = self.legacy.delete();

        self.events.emit(&LicenseEvent::Deactivated {
            slug: self.slug.clone(),
        });

        local?;
        legacy?;
        Ok(outcome)
    }

    /// Current license status.
    ///
    /// With `remote_fetch == false` this never touches the network: it returns
    /// the cached record, else the translated legacy record, else the
    /// canonical unregistered record.
    ///
    /// With `remote_fetch == true` the local view is refreshed from the
    /// service. Transport and API failures are returned as-is and leave the
    /// cache untouched.
    pub fn get_status(&self, remote_fetch: bool) -> Result<EntitlementRecord> {
        let mut current = self.local_status()?;
        if !remote_fetch {
            return Ok(current);
        }

        let remote = self.api_request(
            ACTION_CHECK,
            vec![
                ("license_key", current.license_key.clone()),
                ("activation_hash", current.activation_hash.clone()),
                ("item_id", self.item_id.clone()),
                ("site_url", self.site_url.clone()),
            ],
        )?;

        current.status = LicenseStatus::new(
            field_str(&remote, "status").unwrap_or_else(|| LicenseStatus::UNREGISTERED.into()),
        );
        if let Some(expires) = field_str(&remote, "expiration_date") {
            current.expires = expires;
        }
        if let Some(variation_id) = field_str(&remote, "variation_id") {
            current.variation_id = variation_id;
        }
        if let Some(variation_title) = field_str(&remote, "variation_title") {
            current.variation_title = variation_title;
        }

        // Nothing worth caching for a slug that was never activated.
        if !current.is_absent() {
            store::set_typed(self.store.as_ref(), &self.record_key, &current.persisted())?;
        }
        tracing::debug!(slug = %self.slug, status = %current.status, "status refreshed");

        current.renew_url = Some(field_str(&remote, "renew_url").unwrap_or_default());
        current.is_expired = Some(remote.get("is_expired").is_some_and(truthy));
        if let Some(error_type) = field_str(&remote, "error_type") {
            current.error_type = Some(error_type);
            current.error_message = Some(field_str(&remote, "message").unwrap_or_default());
        }

        Ok(current)
    }

    /// Key of the cached (or legacy) license, empty when unregistered.
    /// Read by the update checker to authorize downloads.
    pub fn current_license_key(&self) -> Result<String> {
        Ok(self.local_status()?.license_key)
    }

    fn local_status(&self) -> Result<EntitlementRecord> {
        let stored: Option<EntitlementRecord> =
            store::get_typed(self.store.as_ref(), &self.record_key)?;
        if let Some(record) = stored.filter(|r| !r.is_absent()) {
            tracing::debug!(slug = %self.slug, status = %record.status, "cached license");
            return Ok(record);
        }

        if let Some(record) = self.legacy.translated()? {
            tracing::debug!(slug = %self.slug, "using legacy license record");
            return Ok(record);
        }

        Ok(EntitlementRecord::unregistered())
    }

    /// POSTs `action` to the API. Caller fields override the
    /// `item_id`/`current_version`/`site_url` defaults.
    fn api_request(&self, action: &str, payload: Vec<(&str, String)>) -> Result<Value> {
        let url = self.action_url(action);
        let form = self.build_form(payload);

        tracing::debug!(slug = %self.slug, action, "entitlement API request");

        let response = self
            .transport
            .post_form(url.as_str(), &form, self.timeout)
            .map_err(|e| LicenseError::Network(e.0))?;

        if !response.is_success() {
            let message = serde_json::from_str::<Value>(&response.body)
                .ok()
                .and_then(|body| field_str(&body, "message"))
                .unwrap_or_else(|| {
                    format!("API request failed with status code: {}", response.status)
                });
            return Err(LicenseError::api(message, Some(response.status)));
        }

        match serde_json::from_str::<Value>(&response.body) {
            Ok(Value::Object(map)) if !map.is_empty() => Ok(Value::Object(map)),
            _ => Err(LicenseError::api(EMPTY_RESPONSE, Some(response.status))),
        }
    }

    pub(crate) fn action_url(&self, action: &str) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .append_pair(ACTION_PARAM, &format!("custom_{action}"));
        url
    }

    pub(crate) fn build_form(&self, payload: Vec<(&str, String)>) -> Vec<(String, String)> {
        let mut form: Vec<(String, String)> = vec![
            ("item_id".to_string(), self.item_id.clone()),
            ("current_version".to_string(), self.version.clone()),
            ("site_url".to_string(), self.site_url.clone()),
        ];
        for (name, value) in payload {
            match form.iter_mut().find(|(existing, _)| existing == name) {
                Some(slot) => slot.1 = value,
                None => form.push((name.to_string(), value)),
            }
        }
        form
    }
}

/// Non-empty scalar field of a JSON object, as a trimmed string.
fn field_str(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(scalar_to_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "0")
}

/// Loose truthiness for flags the API sends as bools, numbers or strings.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "0" && s != "false",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}
