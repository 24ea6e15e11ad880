//! Activate command: submit a key to the license server

use anyhow::Result;
use colored::Colorize;

use super::open_session;
use crate::output::{json, terminal};
use crate::Cli;

pub fn run(cli: &Cli, key: &str) -> Result<bool> {
    let session = open_session(cli)?;

    if !cli.json {
        eprint!("  Activating {}... ", session.facade().config().plugin_name.bold());
    }
    let resp = session.activate(key);

    if cli.json {
        json::print(&resp)?;
    } else {
        if resp.is_success() {
            eprintln!("{}", "done".green());
        } else {
            eprintln!("{}", "failed".red());
        }
        terminal::print_outcome(&resp);
    }

    Ok(resp.is_success())
}
