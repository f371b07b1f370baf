//! # Current Branch Resolution
//!
//! Git has no single query that reliably names the branch a checkout is on:
//! detached checkouts, shallow clones and disabled decorations all hide it
//! from the obvious commands. Resolution therefore runs an ordered list of
//! strategies. Each one pairs a git command with a pure parser, and the first
//! parser that produces a candidate wins. If every strategy comes back empty
//! the repository fails with [`AmbiguousBranchError`]; guessing the trunk
//! would attribute divergence numbers to the wrong branch.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::branch::BranchName;
use crate::error::{AmbiguousBranchError, AuditError};
use crate::vcs::{GitCommand, VcsCommandPort};

/// Strategies in the order they are attempted.
pub const STRATEGIES: [ResolutionStrategy; 2] = [ResolutionStrategy::Decoration, ResolutionStrategy::Containment];

/// One way of finding the current branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
  /// Parse the ref names decorating HEAD.
  Decoration,
  /// Rank the local branches whose history contains HEAD.
  Containment,
}

impl ResolutionStrategy {
  pub fn name(self) -> &'static str {
    match self {
      Self::Decoration => "decoration",
      Self::Containment => "containment",
    }
  }

  /// Command whose output [`ResolutionStrategy::parse`] understands.
  pub fn command(self) -> GitCommand<'static> {
    match self {
      Self::Decoration => GitCommand::DecoratedRefs,
      Self::Containment => GitCommand::BranchesContainingHead,
    }
  }

  /// Pick a candidate from raw command output, or `None` when this strategy
  /// cannot see the branch.
  pub fn parse(self, output: &str, context: &ResolveContext<'_>) -> Option<BranchName> {
    match self {
      Self::Decoration => decoration_candidates(output, context.remote).into_iter().next(),
      Self::Containment => containment_candidates(output, context.trunk).into_iter().next(),
    }
  }
}

/// Names the parsers need to interpret command output.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
  /// Remote whose prefix is stripped from short-form remote decorations.
  pub remote: &'a str,
  /// Trunk branch, ranked last among containment candidates.
  pub trunk: &'a str,
}

/// The branch a repository was found to be on, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentBranch {
  pub name: BranchName,
  pub strategy: ResolutionStrategy,
}

/// Run the strategy cascade against `repo`.
pub async fn resolve_current_branch<P: VcsCommandPort>(
  port: &P,
  repo: &Path,
  context: &ResolveContext<'_>,
) -> Result<CurrentBranch, AuditError> {
  for strategy in STRATEGIES {
    let output = strategy
      .command()
      .run(port, repo)
      .await
      .map_err(AuditError::Resolve)?;

    if let Some(name) = strategy.parse(&output, context) {
      debug!("Resolved current branch of {} to {} via {}", repo.display(), name, strategy.name());
      return Ok(CurrentBranch { name, strategy });
    }

    debug!("Strategy {} found no branch in {}", strategy.name(), repo.display());
  }

  Err(
    AmbiguousBranchError {
      attempted: STRATEGIES.iter().map(|strategy| strategy.name()).collect(),
    }
    .into(),
  )
}

/// Normalised branch names from `git show -s --decorate=full --pretty=%d HEAD`,
/// in the order git printed them.
///
/// Short-form decorations are accepted too; there only `remote`'s prefix can
/// be told apart from a local branch with a slash in its name.
pub fn decoration_candidates(output: &str, remote: &str) -> Vec<BranchName> {
  output
    .split(',')
    .filter_map(|item| normalize_decoration(item, remote))
    .collect()
}

fn normalize_decoration(item: &str, remote: &str) -> Option<BranchName> {
  let item = item.replace(['(', ')'], "");
  let item = item.trim();
  let item = item.strip_prefix("HEAD -> ").unwrap_or(item).trim();

  if item == "HEAD" || item == "grafted" || item.starts_with("tag: ") {
    return None;
  }

  let name = if let Some(local) = item.strip_prefix("refs/heads/") {
    local
  } else if let Some(remote_ref) = item.strip_prefix("refs/remotes/") {
    // Any remote: the branch name is everything after the remote's name.
    remote_ref.split_once('/')?.1
  } else if item.starts_with("refs/") {
    // Stash, notes and other non-branch refs.
    return None;
  } else {
    item
      .strip_prefix(remote)
      .and_then(|rest| rest.strip_prefix('/'))
      .unwrap_or(item)
  };

  if name == "HEAD" {
    return None;
  }
  BranchName::normalized(name)
}

/// Ranked branch names from `git branch --contains HEAD`.
///
/// The checked-out branch (`*`) ranks first and the trunk ranks last; the
/// rest sort by name so the result is deterministic. Detached-HEAD
/// placeholder lines are dropped.
pub fn containment_candidates(output: &str, trunk: &str) -> Vec<BranchName> {
  let mut candidates: Vec<(bool, BranchName)> = output
    .lines()
    .filter_map(|line| {
      let line = line.trim();
      let (checked_out, name) = match line.strip_prefix('*') {
        Some(rest) => (true, rest.trim()),
        // `+` marks a branch checked out in another worktree.
        None => (false, line.strip_prefix('+').unwrap_or(line).trim()),
      };

      if is_detached_placeholder(name) {
        return None;
      }
      BranchName::normalized(name).map(|name| (checked_out, name))
    })
    .collect();

  candidates.sort_by(|(a_marked, a), (b_marked, b)| {
    (!a_marked, a.as_str() == trunk, a).cmp(&(!b_marked, b.as_str() == trunk, b))
  });
  candidates.dedup_by(|(_, a), (_, b)| a == b);
  candidates.into_iter().map(|(_, name)| name).collect()
}

fn is_detached_placeholder(name: &str) -> bool {
  name.starts_with("(HEAD detached") || name.starts_with("(no branch")
}
