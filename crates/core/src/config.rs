//! License configuration, usually loaded from `keyward.toml`

use crate::error::LicenseError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Static product configuration, supplied once and validated at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseConfig {
    /// Product identifier on the entitlement service
    #[serde(default)]
    pub item_id: String,

    /// Product slug; records are namespaced by it
    #[serde(default)]
    pub plugin_slug: String,

    /// Path of the main plugin file (e.g. `my-plugin/my-plugin.php`).
    /// Used to derive the slug when `plugin_slug` is empty.
    #[serde(default)]
    pub plugin_file: String,

    #[serde(default)]
    pub plugin_name: String,

    #[serde(default)]
    pub plugin_version: String,

    /// Base URL of the entitlement API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// URL of the site the license is activated for
    #[serde(default = "default_site_url")]
    pub site_url: String,

    #[serde(default = "default_menu_title")]
    pub menu_title: String,

    /// Admin page slug (defaults to `<slug>-license`)
    #[serde(default)]
    pub menu_slug: String,

    #[serde(default)]
    pub pricing_page_url: String,

    #[serde(default = "default_api_url")]
    pub account_url: String,

    #[serde(default = "default_true")]
    pub show_action_link: bool,

    #[serde(default)]
    pub activate_redirect_url: String,

    /// Falls back to `activate_redirect_url` when empty
    #[serde(default)]
    pub deactivate_redirect_url: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://portal.wppool.dev/".to_string()
}

fn default_site_url() -> String {
    "http://localhost".to_string()
}

fn default_menu_title() -> String {
    "License".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            item_id: String::new(),
            plugin_slug: String::new(),
            plugin_file: String::new(),
            plugin_name: String::new(),
            plugin_version: String::new(),
            api_url: default_api_url(),
            site_url: default_site_url(),
            menu_title: default_menu_title(),
            menu_slug: String::new(),
            pricing_page_url: String::new(),
            account_url: default_api_url(),
            show_action_link: true,
            activate_redirect_url: String::new(),
            deactivate_redirect_url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LicenseConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: LicenseConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Checks required fields in order and names the first one missing.
    pub fn validate(&self) -> Result<(), LicenseError> {
        if self.slug().is_empty() {
            return Err(LicenseError::Configuration {
                field: "plugin_slug",
            });
        }
        let required = [
            ("plugin_name", &self.plugin_name),
            ("plugin_version", &self.plugin_version),
            ("item_id", &self.item_id),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(LicenseError::Configuration { field });
            }
        }
        Ok(())
    }

    /// The product slug: `plugin_slug`, else the directory holding
    /// `plugin_file`, else the file's stem.
    pub fn slug(&self) -> String {
        if !self.plugin_slug.trim().is_empty() {
            return self.plugin_slug.trim().to_string();
        }
        let file = Path::new(self.plugin_file.trim());
        let from_dir = file
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str());
        let from_stem = file.file_stem().and_then(|n| n.to_str());
        from_dir.or(from_stem).unwrap_or_default().to_string()
    }

    /// Admin page slug for the license screen.
    pub fn menu_slug(&self) -> String {
        if self.menu_slug.is_empty() {
            format!("{}-license", self.slug())
        } else {
            self.menu_slug.clone()
        }
    }

    pub fn deactivate_redirect(&self) -> &str {
        if self.deactivate_redirect_url.is_empty() {
            &self.activate_redirect_url
        } else {
            &self.deactivate_redirect_url
        }
    }
}
