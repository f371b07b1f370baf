//! # Command Line Interface
//!
//! Defines the `drift` arguments, turns them into an [`AuditConfig`] and runs
//! the audit on a tokio runtime.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ArgAction, Parser, ValueEnum};
use drift_core::{AuditConfig, ConfigDirs, FleetRunner, RepositoryReport, SilentObserver};
use tracing::{debug, warn};

use crate::output::ColorMode;
use crate::render::{ConsoleReporter, render_json};

const LONG_VERSION: &str = concat!(
  env!("CARGO_PKG_VERSION"),
  " (",
  env!("GIT_HASH"),
  " ",
  env!("TARGET"),
  ")"
);

/// How the final reports are printed
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
  /// Narrated progress followed by a summary table
  #[default]
  Text,
  /// A single JSON document on stdout, no narration
  Json,
}

/// Top-level CLI command for drift
#[derive(Parser, Debug)]
#[command(name = "drift")]
#[command(display_name = "🧭 Drift")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(about = "Find branches that drifted from their remote and from trunk")]
#[command(
  long_about = "Drift walks a directory tree, audits every git checkout it finds and reports, for each\n\
        remote branch, how far the local copy is behind the remote and how far the branch\n\
        has moved relative to the trunk.\n\n\
        Each repository is fetched (with pruning) and every remote branch gets a local\n\
        tracking branch unless --no-track is given. Nothing else is modified."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = LONG_VERSION)]
#[command(max_term_width = 120)]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightGreen.on_default().bold().underline())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightGreen.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// Directory to search for repositories
  #[arg(value_name = "PATH", default_value = ".")]
  pub root: PathBuf,

  /// Read settings from this file instead of the user config file
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Remote whose branches are audited
  #[arg(long, value_name = "NAME")]
  pub remote: Option<String>,

  /// Trunk branch to compare against (default: the remote's HEAD, else master)
  #[arg(long, value_name = "BRANCH")]
  pub trunk: Option<String>,

  /// Seconds a single git command may run
  #[arg(long = "timeout-secs", value_name = "SECS")]
  pub timeout_secs: Option<u64>,

  /// How many directories below PATH to search
  #[arg(long = "max-depth", value_name = "N")]
  pub max_depth: Option<usize>,

  /// Do not create local tracking branches
  #[arg(long = "no-track")]
  pub no_track: bool,

  /// Output format
  #[arg(long, value_enum, ignore_case = true, default_value_t = OutputFormat::Text)]
  pub format: OutputFormat,

  /// Controls when colored output is used
  #[arg(
    long,
    value_enum,
    ignore_case = true,
    default_value_t = ColorMode::Auto,
  )]
  pub colors: ColorMode,

  /// Sets the level of verbosity (can be used multiple times)
  #[arg(
    short = 'v',
    long = "verbose",
    action = ArgAction::Count,
    long_help = "Sets the level of verbosity for tracing and logging output.\n\n\
             -v: Show info level messages\n\
             -vv: Show debug level messages\n\
             -vvv: Show trace level messages"
  )]
  pub verbose: u8,
}

impl Cli {
  /// File settings with command-line overrides applied on top.
  pub fn audit_config(&self) -> Result<AuditConfig> {
    let mut config = match &self.config {
      Some(path) => {
        if !path.exists() {
          bail!("Config file {} does not exist", path.display());
        }
        AuditConfig::load_from(path)?
      }
      None => AuditConfig::load(&ConfigDirs::new()?)?,
    };

    if let Some(remote) = &self.remote {
      config.remote = remote.clone();
    }
    if let Some(trunk) = &self.trunk {
      config.trunk_branch = Some(trunk.clone());
    }
    if let Some(timeout) = self.timeout_secs {
      config.command_timeout_secs = timeout;
    }
    if let Some(depth) = self.max_depth {
      config.max_depth = Some(depth);
    }
    if self.no_track {
      config.establish_tracking = false;
    }

    config.validate().context("Invalid command-line options")?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
  }
}

/// Exit status for a finished run: failure if any repository stopped early.
pub fn exit_status(reports: &[RepositoryReport]) -> ExitCode {
  if reports.iter().all(RepositoryReport::is_complete) {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  }
}

/// Run drift with parsed arguments.
///
/// Errors returned here happened before any repository was audited.
pub fn handle_cli(cli: Cli) -> Result<ExitCode> {
  cli.colors.apply();

  let config = cli.audit_config()?;
  let runtime = tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()
    .context("Failed to start the async runtime")?;

  runtime.block_on(run(&cli, config))
}

async fn run(cli: &Cli, config: AuditConfig) -> Result<ExitCode> {
  let runner = FleetRunner::new(config.git(), config);

  let cancel = runner.cancellation();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("Interrupted, stopping after the current git command");
      cancel.cancel();
    }
  });

  let reports = match cli.format {
    OutputFormat::Text => {
      let mut reporter = ConsoleReporter::new();
      runner.audit_root(&cli.root, &mut reporter).await?
    }
    OutputFormat::Json => {
      let reports = runner.audit_root(&cli.root, &mut SilentObserver).await?;
      println!("{}", render_json(&reports)?);
      reports
    }
  };

  Ok(exit_status(&reports))
}
