//! CLI commands

pub mod activate;
pub mod deactivate;
pub mod info;
pub mod init;
pub mod status;

use crate::{Cli, Session};
use anyhow::Result;

/// Opens a session from the global `--config` and `--data-dir` flags.
pub(crate) fn open_session(cli: &Cli) -> Result<Session> {
    Session::open(&cli.config, cli.data_dir.as_deref())
}
