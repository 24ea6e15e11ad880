//! Status command: refresh from the license server, or show the local record

use anyhow::Result;

use super::open_session;
use crate::output::{json, terminal};
use crate::Cli;

pub fn run(cli: &Cli, cached: bool) -> Result<bool> {
    let session = open_session(cli)?;

    if cached {
        let record = session.facade().get_data();
        if cli.json {
            json::print(&keyward_core::endpoint::public_view(record))?;
        } else {
            terminal::print_record(record);
        }
        return Ok(true);
    }

    let resp = session.status();
    let refreshed = resp.body.get("remote_data").is_some();

    if cli.json {
        json::print(&resp.body)?;
        return Ok(refreshed);
    }

    if let Some(data) = resp.body.get("remote_data") {
        terminal::print_status_fields(data);
    }
    if let Some(notice) = resp.body.get("error_notice").and_then(|n| n.as_str()) {
        terminal::print_notice(notice);
    }

    Ok(refreshed)
}
