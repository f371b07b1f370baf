//! Remote branch enumeration.
//!
//! Fetches every remote (pruning deleted branches) and lists the branches
//! visible under the audited remote's namespace.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::branch::BranchName;
use crate::consts::SYMBOLIC_REF_ARROW;
use crate::error::AuditError;
use crate::vcs::{GitCommand, VcsCommandPort};

/// Branches present on a remote as of the latest fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoteBranchSet {
  /// Real branches, in the order git listed them, without duplicates.
  pub branches: Vec<BranchName>,
  /// Target of the remote's default-branch alias (`origin/HEAD`), if any.
  pub default_branch: Option<BranchName>,
}

impl RemoteBranchSet {
  pub fn contains(&self, branch: &BranchName) -> bool {
    self.branches.contains(branch)
  }

  pub fn len(&self) -> usize {
    self.branches.len()
  }

  pub fn is_empty(&self) -> bool {
    self.branches.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &BranchName> {
    self.branches.iter()
  }
}

/// Fetch all remotes with pruning, then list `remote`'s branches.
///
/// Either command failing ends the repository's audit: divergence numbers
/// computed after a failed fetch would describe stale refs.
pub async fn enumerate_remote_branches<P: VcsCommandPort>(
  port: &P,
  repo: &Path,
  remote: &str,
) -> Result<RemoteBranchSet, AuditError> {
  GitCommand::FetchAllPrune
    .run(port, repo)
    .await
    .map_err(AuditError::Fetch)?;

  let listing = GitCommand::ListRemoteBranches { remote }
    .run(port, repo)
    .await
    .map_err(AuditError::Enumerate)?;

  let set = parse_remote_branches(&listing);
  debug!(
    "Found {} remote branches in {} (default: {:?})",
    set.len(),
    repo.display(),
    set.default_branch
  );
  Ok(set)
}

/// Parse `git branch -r` output into a [`RemoteBranchSet`].
///
/// Every alias line (`origin/HEAD -> origin/main`) is dropped; its target is
/// kept as the default branch. The branch name is the text after the first
/// `/`.
pub fn parse_remote_branches(output: &str) -> RemoteBranchSet {
  let mut set = RemoteBranchSet::default();

  for line in output.lines().map(str::trim).filter(|line| !line.is_empty()) {
    if let Some((_, target)) = line.split_once(SYMBOLIC_REF_ARROW) {
      if set.default_branch.is_none() {
        set.default_branch = strip_namespace(target.trim());
      }
      continue;
    }

    let Some(branch) = strip_namespace(line) else {
      continue;
    };
    if !set.branches.contains(&branch) {
      set.branches.push(branch);
    }
  }

  set
}

fn strip_namespace(qualified: &str) -> Option<BranchName> {
  let (_, branch) = qualified.split_once('/')?;
  BranchName::normalized(branch)
}
