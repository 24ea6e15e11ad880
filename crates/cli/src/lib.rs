//! Keyward CLI library, exposed for integration tests

pub mod commands;
pub mod output;
pub mod session;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use session::Session;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "keyward.toml";

#[derive(Parser)]
#[command(name = "keyward")]
#[command(about = "Activate, check and release product licenses", long_about = None)]
#[command(version = keyward_core::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Product configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory holding cached license records (default: ~/.config/keyward)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print raw JSON responses
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter keyward.toml
    Init {
        /// Directory to initialize (default: current directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Activate a license key for this site
    Activate {
        /// License key to activate
        key: String,
    },

    /// Release the activation and clear the local record
    Deactivate,

    /// Show license status
    Status {
        /// Read the local record only, without contacting the license server
        #[arg(long)]
        cached: bool,
    },

    /// Show product and license summary
    Info,
}

/// Log filter for the given `-v` count. `RUST_LOG` wins when set.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "warn,keyward_cli=info,keyward_core=info",
        2 => "info,keyward_cli=debug,keyward_core=debug",
        _ => "trace",
    }
}
