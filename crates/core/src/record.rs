//! Entitlement records: the cached license state and its legacy predecessor

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// License status as reported by the entitlement service.
///
/// Kept open: unknown values from the remote are preserved verbatim for
/// display, and only the sentinels below drive branching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseStatus(String);

impl LicenseStatus {
    pub const UNREGISTERED: &'static str = "unregistered";
    pub const VALID: &'static str = "valid";
    pub const EXPIRED: &'static str = "expired";
    pub const DISABLED: &'static str = "disabled";
    pub const ERROR: &'static str = "error";

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn unregistered() -> Self {
        Self::new(Self::UNREGISTERED)
    }

    pub fn valid() -> Self {
        Self::new(Self::VALID)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0 == Self::VALID
    }

    pub fn is_unregistered(&self) -> bool {
        self.0 == Self::UNREGISTERED
    }
}

impl Default for LicenseStatus {
    fn default() -> Self {
        Self::unregistered()
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for LicenseStatus {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The cached entitlement for one product slug.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntitlementRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub license_key: String,
    #[serde(default)]
    pub status: LicenseStatus,
    #[serde(default, deserialize_with = "lenient_string")]
    pub variation_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub variation_title: String,
    /// Expiration date, or [`EntitlementRecord::NEVER_EXPIRES`]
    #[serde(default, deserialize_with = "lenient_string")]
    pub expires: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub activation_hash: String,

    // Populated by a remote status refresh only; never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renew_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expired: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl EntitlementRecord {
    pub const NEVER_EXPIRES: &'static str = "lifetime";

    /// The canonical record for a slug with nothing stored.
    pub fn unregistered() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }

    /// A stored record without a key counts as no record at all.
    pub fn is_absent(&self) -> bool {
        self.license_key.trim().is_empty()
    }

    pub fn never_expires(&self) -> bool {
        self.expires == Self::NEVER_EXPIRES
    }

    /// Copy of the record with the refresh-only fields cleared, as persisted.
    pub fn persisted(&self) -> Self {
        Self {
            renew_url: None,
            is_expired: None,
            error_type: None,
            error_message: None,
            ..self.clone()
        }
    }
}

impl fmt::Debug for EntitlementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitlementRecord")
            .field("license_key", &mask_key(&self.license_key))
            .field("status", &self.status)
            .field("variation_id", &self.variation_id)
            .field("variation_title", &self.variation_title)
            .field("expires", &self.expires)
            .field("activation_hash", &self.activation_hash)
            .field("renew_url", &self.renew_url)
            .field("is_expired", &self.is_expired)
            .field("error_type", &self.error_type)
            .field("error_message", &self.error_message)
            .finish()
    }
}

/// Record written by the previous licensing provider.
///
/// Read-only: consulted when no current record exists and deleted on
/// deactivation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyEntitlementRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub key: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
}

impl LegacyEntitlementRecord {
    pub const ACTIVATE: &'static str = "activate";

    pub fn is_active(&self) -> bool {
        self.status == Self::ACTIVATE
    }

    /// Synthetic current record for an active legacy license.
    pub fn to_entitlement(&self) -> EntitlementRecord {
        EntitlementRecord {
            license_key: self.key.trim().to_string(),
            status: LicenseStatus::valid(),
            variation_id: self.source_id.trim().to_string(),
            variation_title: self.title.trim().to_string(),
            ..EntitlementRecord::default()
        }
    }
}

/// Masks a license key for logs: first and last four characters only.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}\u{2026}{tail}")
}

/// Accepts strings, numbers, booleans or null where a string is expected.
/// Stored records and remote payloads are not strict about scalar types.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value).unwrap_or_default())
}

/// String form of a JSON scalar; `None` for null, arrays and objects.
pub(crate) fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(if *b { "1".into() } else { String::new() }),
        _ => None,
    }
}
