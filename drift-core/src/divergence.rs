//! # Divergence Calculation
//!
//! Commit-count deltas for one branch against its remote counterpart and
//! against the trunk, plus the classification renderers use to decide how
//! loudly to report them.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::branch::BranchName;
use crate::error::VcsCommandError;
use crate::vcs::{GitCommand, VcsCommandPort};

/// Commit counts for one branch.
///
/// Trunk-relative fields are `None` for the trunk itself: it is compared to
/// nothing, which is different from being level with itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DivergenceReport {
  /// Commits on the remote branch that the local branch has not seen.
  pub behind_remote: u64,
  /// Commits on the local branch not yet on the remote.
  pub ahead_of_remote: u64,
  /// Commits on the remote branch not yet on the remote trunk.
  pub ahead_of_trunk: Option<u64>,
  /// Commits on the remote trunk not yet on the remote branch.
  pub behind_trunk: Option<u64>,
  pub is_trunk: bool,
}

/// Position of a local branch relative to its remote counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
  UpToDate,
  /// Local is stale relative to the remote.
  Behind(u64),
}

/// Position of a branch relative to the trunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrunkStatus {
  /// The branch is the trunk; nothing was compared.
  IsTrunk,
  /// The branch is missing trunk commits.
  Behind { behind: u64, ahead: u64 },
  /// The branch has every trunk commit, plus `n` of its own.
  Ahead(u64),
}

/// How prominently a finding should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Info,
  /// Stale, but not the branch the user is working on.
  Notice,
  /// The user's own current branch is stale.
  Warn,
}

impl Severity {
  fn for_stale(stale: bool, is_current: bool) -> Self {
    match (stale, is_current) {
      (false, _) => Self::Info,
      (true, false) => Self::Notice,
      (true, true) => Self::Warn,
    }
  }
}

impl DivergenceReport {
  pub fn remote_status(&self) -> RemoteStatus {
    if self.behind_remote > 0 {
      RemoteStatus::Behind(self.behind_remote)
    } else {
      RemoteStatus::UpToDate
    }
  }

  pub fn trunk_status(&self) -> TrunkStatus {
    match (self.is_trunk, self.behind_trunk, self.ahead_of_trunk) {
      (false, Some(behind), ahead) if behind > 0 => TrunkStatus::Behind {
        behind,
        ahead: ahead.unwrap_or_default(),
      },
      (false, Some(_), ahead) => TrunkStatus::Ahead(ahead.unwrap_or_default()),
      _ => TrunkStatus::IsTrunk,
    }
  }

  pub fn remote_severity(&self, is_current: bool) -> Severity {
    Severity::for_stale(matches!(self.remote_status(), RemoteStatus::Behind(_)), is_current)
  }

  pub fn trunk_severity(&self, is_current: bool) -> Severity {
    Severity::for_stale(matches!(self.trunk_status(), TrunkStatus::Behind { .. }), is_current)
  }

  /// The louder of the remote and trunk severities.
  pub fn severity(&self, is_current: bool) -> Severity {
    self.remote_severity(is_current).max(self.trunk_severity(is_current))
  }

  pub fn is_stale(&self) -> bool {
    self.severity(false) > Severity::Info
  }
}

/// What to compare for one branch.
#[derive(Debug, Clone, Copy)]
pub struct DivergenceQuery<'a> {
  pub branch: &'a BranchName,
  pub trunk: &'a BranchName,
  pub remote: &'a str,
  /// The current branch is compared from `HEAD` so an unborn or untracked
  /// local branch name does not matter.
  pub is_current: bool,
  /// Whether `refs/heads/<branch>` exists. Without it there is no local copy
  /// to be stale, and only the trunk comparison runs.
  pub has_local: bool,
}

impl DivergenceQuery<'_> {
  /// The local side of the remote comparison, if there is one.
  ///
  /// Non-current branches use the full ref so a same-named tag cannot win.
  fn local_ref(&self) -> Option<String> {
    if self.is_current {
      Some("HEAD".to_string())
    } else if self.has_local {
      Some(format!("refs/heads/{}", self.branch))
    } else {
      None
    }
  }
}

/// Count commits for `query.branch`.
///
/// Any failure is scoped to this branch; callers record it and move on.
pub async fn compute_divergence<P: VcsCommandPort>(
  port: &P,
  repo: &Path,
  query: &DivergenceQuery<'_>,
) -> Result<DivergenceReport, VcsCommandError> {
  let remote_ref = query.branch.on_remote(query.remote);

  let (ahead_of_remote, behind_remote) = match query.local_ref() {
    Some(local_ref) => count_left_right(port, repo, &local_ref, &remote_ref).await?,
    None => {
      debug!("{} has no local branch; skipping remote comparison", query.branch);
      (0, 0)
    }
  };

  if query.branch == query.trunk {
    debug!("{} is the trunk; skipping trunk comparison", query.branch);
    return Ok(DivergenceReport {
      behind_remote,
      ahead_of_remote,
      ahead_of_trunk: None,
      behind_trunk: None,
      is_trunk: true,
    });
  }

  let trunk_ref = query.trunk.on_remote(query.remote);
  let (behind_trunk, ahead_of_trunk) = count_left_right(port, repo, &trunk_ref, &remote_ref).await?;

  Ok(DivergenceReport {
    behind_remote,
    ahead_of_remote,
    ahead_of_trunk: Some(ahead_of_trunk),
    behind_trunk: Some(behind_trunk),
    is_trunk: false,
  })
}

async fn count_left_right<P: VcsCommandPort>(
  port: &P,
  repo: &Path,
  left: &str,
  right: &str,
) -> Result<(u64, u64), VcsCommandError> {
  let command = GitCommand::CountLeftRight { left, right };
  let output = command.run(port, repo).await?;
  parse_left_right(&output).ok_or_else(|| VcsCommandError::UnexpectedOutput {
    command: command.args().join(" "),
    output,
  })
}

/// Parse the `<left>\t<right>` line printed by `rev-list --left-right --count`.
pub fn parse_left_right(output: &str) -> Option<(u64, u64)> {
  let mut numbers = output.split_whitespace().map(str::parse::<u64>);
  let left = numbers.next()?.ok()?;
  let right = numbers.next()?.ok()?;
  if numbers.next().is_some() {
    return None;
  }
  Some((left, right))
}
