//! Keyward CLI - license activation host

use clap::Parser;
use colored::Colorize;
use keyward_cli::{commands, log_filter, Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::debug!("fatal: {e:?}");
            eprintln!("  {} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Init { path, force } => commands::init::run(path.as_deref(), *force),
        Commands::Activate { key } => commands::activate::run(cli, key),
        Commands::Deactivate => commands::deactivate::run(cli),
        Commands::Status { cached } => commands::status::run(cli, *cached),
        Commands::Info => commands::info::run(cli),
    }
}
