//! Deactivate command: release the activation and forget the key

use anyhow::Result;
use colored::Colorize;

use super::open_session;
use crate::output::{json, terminal};
use crate::Cli;

pub fn run(cli: &Cli) -> Result<bool> {
    let session = open_session(cli)?;
    let resp = session.deactivate();

    if cli.json {
        json::print(&resp)?;
        return Ok(resp.is_success());
    }

    terminal::print_outcome(&resp);
    if resp.body["remote_deactivated"] == false {
        eprintln!(
            "  {}",
            "The license server could not be reached; the activation may still count against your limit."
                .dimmed()
        );
    }

    Ok(resp.is_success())
}
