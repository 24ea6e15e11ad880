//! Info command: product, license summary and where records live

use anyhow::Result;
use colored::Colorize;

use super::open_session;
use crate::output::{json, terminal};
use crate::Cli;

pub fn run(cli: &Cli) -> Result<bool> {
    let session = open_session(cli)?;
    let facade = session.facade();
    let info = facade.license_info();

    if cli.json {
        json::print(&info)?;
        return Ok(true);
    }

    eprintln!(
        "  {} {}",
        info.plugin_name.bold(),
        info.plugin_version.dimmed()
    );
    eprintln!("  {}: {}", "Slug".bold(), facade.config().slug());
    terminal::print_record(facade.get_data());
    if let Some(link) = facade.action_link() {
        eprintln!("  {}: {}", link.label.bold(), link.url.dimmed());
    }
    eprintln!(
        "  {}: {}",
        "Records".bold(),
        session.data_dir().display().to_string().dimmed()
    );

    Ok(true)
}
