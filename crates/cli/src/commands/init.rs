//! Initialize keyward.toml configuration

use anyhow::Result;
use keyward_core::LicenseConfig;
use std::path::Path;

use crate::DEFAULT_CONFIG_FILE;

pub fn run(path: Option<&Path>, force: bool) -> Result<bool> {
    let target_path = path.unwrap_or_else(|| Path::new("."));
    let config_path = target_path.join(DEFAULT_CONFIG_FILE);

    if config_path.exists() && !force {
        println!("⚠️  {} already exists at {:?}", DEFAULT_CONFIG_FILE, config_path);
        return Ok(false);
    }

    LicenseConfig::default().save(&config_path)?;

    println!("✅ Created {} at {:?}", DEFAULT_CONFIG_FILE, config_path);
    println!("\nFill in item_id, plugin_slug, plugin_name and plugin_version, then run:");
    println!("  keyward activate <LICENSE_KEY>");

    Ok(true)
}
