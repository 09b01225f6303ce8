//! `tasktally` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging, open the database.
//! - Map core errors to stable exit codes.

mod args;
mod commands;
mod error;

use args::Cli;
use clap::Parser;
use error::CliError;
use log::error;
use std::process::ExitCode;
use tasktally_core::{init_logging, open_db, ConfigOverrides, TrackerConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            error!("event=cli_exit module=cli status=error exit_code={code}");
            eprintln!("error: {err}");
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = TrackerConfig::from_env()?.with_overrides(ConfigOverrides {
        db_path: cli.db,
        log_level: cli.log_level,
        log_dir: cli.log_dir,
    })?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    commands::run(&conn, cli.command)
}
