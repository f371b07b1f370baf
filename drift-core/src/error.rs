//! Error types produced by the audit engine.
//!
//! Errors are values here: a failed branch or repository is recorded in its
//! report rather than aborting the run, so every type is `Clone` and carries
//! enough text to be rendered later.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// A git invocation did not produce usable output.
#[derive(Debug, Clone, Error)]
pub enum VcsCommandError {
  /// The process ran and exited with a non-zero status.
  #[error("`git {command}` exited with status {exit_code}: {stderr}")]
  NonZeroExit {
    command: String,
    exit_code: i32,
    stderr: String,
  },

  /// The process was terminated by a signal and has no exit code.
  #[error("`git {command}` was terminated before exiting: {stderr}")]
  Terminated { command: String, stderr: String },

  /// The process did not finish within the configured timeout.
  #[error("`git {command}` timed out after {}s", timeout.as_secs())]
  TimedOut { command: String, timeout: Duration },

  /// The process could not be started at all.
  #[error("failed to run `git {command}`: {source}")]
  Spawn {
    command: String,
    #[source]
    source: Arc<std::io::Error>,
  },

  /// The process succeeded but printed something we could not parse.
  #[error("`git {command}` printed unexpected output: {output:?}")]
  UnexpectedOutput { command: String, output: String },
}

impl VcsCommandError {
  /// The command line (without the executable) that failed.
  pub fn command(&self) -> &str {
    match self {
      Self::NonZeroExit { command, .. }
      | Self::Terminated { command, .. }
      | Self::TimedOut { command, .. }
      | Self::Spawn { command, .. }
      | Self::UnexpectedOutput { command, .. } => command,
    }
  }

  /// Exit status of the process, when it exited on its own.
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      Self::NonZeroExit { exit_code, .. } => Some(*exit_code),
      _ => None,
    }
  }

  /// Captured standard error, empty when none was collected.
  pub fn stderr(&self) -> &str {
    match self {
      Self::NonZeroExit { stderr, .. } | Self::Terminated { stderr, .. } => stderr,
      _ => "",
    }
  }
}

/// Every branch-resolution strategy came back empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not determine the current branch: {}", attempted.join(", "))]
pub struct AmbiguousBranchError {
  /// Names of the strategies that were tried, in order.
  pub attempted: Vec<&'static str>,
}

/// Failure that ends the audit of a single repository.
#[derive(Debug, Clone, Error)]
pub enum AuditError {
  #[error("failed to fetch remotes: {0}")]
  Fetch(#[source] VcsCommandError),

  #[error("failed to list remote branches: {0}")]
  Enumerate(#[source] VcsCommandError),

  #[error("failed to query the current branch: {0}")]
  Resolve(#[source] VcsCommandError),

  #[error(transparent)]
  AmbiguousBranch(#[from] AmbiguousBranchError),

  #[error("audit cancelled")]
  Cancelled,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn non_zero_exit_exposes_code_and_stderr() {
    let err = VcsCommandError::NonZeroExit {
      command: "fetch --all --prune".to_string(),
      exit_code: 128,
      stderr: "fatal: unable to access remote".to_string(),
    };

    assert_eq!(err.exit_code(), Some(128));
    assert_eq!(err.stderr(), "fatal: unable to access remote");
    assert_eq!(err.command(), "fetch --all --prune");
    assert!(err.to_string().contains("status 128"));
  }

  #[test]
  fn timeout_has_no_exit_code() {
    let err = VcsCommandError::TimedOut {
      command: "fetch --all --prune".to_string(),
      timeout: Duration::from_secs(5),
    };

    assert_eq!(err.exit_code(), None);
    assert_eq!(err.stderr(), "");
    assert!(err.to_string().contains("timed out after 5s"));
  }

  #[test]
  fn ambiguous_branch_lists_strategies() {
    let err = AuditError::from(AmbiguousBranchError {
      attempted: vec!["decoration", "containment"],
    });

    assert_eq!(
      err.to_string(),
      "could not determine the current branch: decoration, containment"
    );
  }
}
