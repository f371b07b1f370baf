//! # Drift CLI Entry Point
//!
//! The main entry point for the drift command-line tool, which reports how far
//! the branches of many git checkouts have drifted from their remote and from
//! trunk.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use drift_cli::cli::{Cli, handle_cli};
use drift_cli::output::print_error;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Exit status for errors raised before any repository was audited.
const USAGE_ERROR: u8 = 2;

fn main() -> ExitCode {
  // Parse CLI arguments using the derive-based implementation
  let cmd = Cli::parse();

  // Set up tracing based on verbosity level
  let level = match cmd.verbose {
    0 => tracing::Level::WARN,  // Default: warnings and errors
    1 => tracing::Level::INFO,  // -v: info, warnings, and errors
    2 => tracing::Level::DEBUG, // -vv: debug, info, warnings, and errors
    _ => tracing::Level::TRACE, // -vvv or more: trace and everything else
  };

  // Logs go to stderr so they never mix with reports on stdout
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(io::stderr))
    .with(EnvFilter::from_default_env().add_directive(level.into()))
    .init();

  debug!("Tracing initialized with level: {}", level);

  match handle_cli(cmd) {
    Ok(code) => code,
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::from(USAGE_ERROR)
    }
  }
}
