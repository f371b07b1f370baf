//! # Git Command Port
//!
//! The engine never spawns processes directly. Every git invocation goes
//! through [`VcsCommandPort`], which keeps the parsing logic testable against
//! canned output and lets the CLI own process concerns such as timeouts.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time;
use tracing::{debug, trace};

use crate::branch::BranchName;
use crate::consts;
use crate::error::VcsCommandError;

/// Capability to run a git command line inside a working copy.
///
/// Implementations return standard output on success and a
/// [`VcsCommandError`] for anything else, including timeouts.
#[allow(async_fn_in_trait)]
pub trait VcsCommandPort {
  async fn execute(&self, args: &[String], working_dir: &Path) -> Result<String, VcsCommandError>;
}

impl<P: VcsCommandPort + ?Sized> VcsCommandPort for &P {
  async fn execute(&self, args: &[String], working_dir: &Path) -> Result<String, VcsCommandError> {
    (**self).execute(args, working_dir).await
  }
}

/// The fixed set of git commands the engine issues.
#[derive(Debug, Clone, Copy)]
pub enum GitCommand<'a> {
  /// Fetch every remote and drop remote-tracking refs deleted upstream.
  FetchAllPrune,
  /// List remote-tracking branches under one remote's namespace.
  ListRemoteBranches { remote: &'a str },
  /// Create a local branch tracking `<remote>/<branch>`.
  CreateTrackingBranch { branch: &'a BranchName, remote: &'a str },
  /// Full ref names decorating the commit at HEAD.
  DecoratedRefs,
  /// Every local branch, as full ref names.
  LocalBranches,
  /// Local branches whose history contains HEAD.
  BranchesContainingHead,
  /// Left/right commit counts for the symmetric range `left...right`.
  CountLeftRight { left: &'a str, right: &'a str },
}

impl GitCommand<'_> {
  /// Arguments passed to the git executable.
  pub fn args(&self) -> Vec<String> {
    match self {
      Self::FetchAllPrune => vec!["fetch".into(), "--all".into(), "--prune".into()],
      Self::ListRemoteBranches { remote } => vec![
        "branch".into(),
        "-r".into(),
        "--no-color".into(),
        "--list".into(),
        format!("{remote}/*"),
      ],
      Self::CreateTrackingBranch { branch, remote } => vec![
        "branch".into(),
        "--track".into(),
        branch.to_string(),
        branch.on_remote(remote),
      ],
      Self::DecoratedRefs => vec![
        "show".into(),
        "-s".into(),
        "--decorate=full".into(),
        "--pretty=%d".into(),
        "HEAD".into(),
      ],
      Self::LocalBranches => vec![
        "for-each-ref".into(),
        "--format=%(refname)".into(),
        "refs/heads/".into(),
      ],
      Self::BranchesContainingHead => vec![
        "branch".into(),
        "--no-color".into(),
        "--contains".into(),
        "HEAD".into(),
      ],
      Self::CountLeftRight { left, right } => vec![
        "rev-list".into(),
        "--left-right".into(),
        "--count".into(),
        format!("{left}...{right}"),
      ],
    }
  }

  /// Run this command through `port` inside `working_dir`.
  pub async fn run<P: VcsCommandPort>(&self, port: &P, working_dir: &Path) -> Result<String, VcsCommandError> {
    port.execute(&self.args(), working_dir).await
  }
}

/// [`VcsCommandPort`] backed by the git binary.
#[derive(Debug, Clone)]
pub struct GitCli {
  executable: String,
  timeout: Duration,
}

impl GitCli {
  pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
    Self {
      executable: executable.into(),
      timeout,
    }
  }
}

impl Default for GitCli {
  fn default() -> Self {
    Self::new(consts::GIT_EXECUTABLE, consts::DEFAULT_COMMAND_TIMEOUT)
  }
}

impl VcsCommandPort for GitCli {
  async fn execute(&self, args: &[String], working_dir: &Path) -> Result<String, VcsCommandError> {
    let command = args.join(" ");
    debug!("Running git {} in {}", command, working_dir.display());

    let mut child = Command::new(&self.executable);
    child
      .args(args)
      .current_dir(working_dir)
      // Messages such as "already exists" are matched verbatim.
      .env("LC_ALL", "C")
      .env("GIT_TERMINAL_PROMPT", "0")
      .stdin(Stdio::null())
      .kill_on_drop(true);

    let output = match time::timeout(self.timeout, child.output()).await {
      Ok(Ok(output)) => output,
      Ok(Err(source)) => {
        return Err(VcsCommandError::Spawn {
          command,
          source: source.into(),
        });
      }
      Err(elapsed) => {
        trace!("git {} hit its deadline: {}", command, elapsed);
        return Err(VcsCommandError::TimedOut {
          command,
          timeout: self.timeout,
        });
      }
    };

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if output.status.success() {
      let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
      trace!("git {} stdout: {:?}", command, stdout);
      return Ok(stdout);
    }

    match output.status.code() {
      Some(exit_code) => Err(VcsCommandError::NonZeroExit {
        command,
        exit_code,
        stderr,
      }),
      None => Err(VcsCommandError::Terminated { command, stderr }),
    }
  }
}
