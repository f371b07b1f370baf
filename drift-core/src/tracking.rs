//! Local tracking branch creation.
//!
//! Best effort by contract: divergence counting compares against the remote
//! refs directly, so a branch that cannot be tracked locally is logged and
//! skipped rather than failing the audit.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::branch::BranchName;
use crate::error::VcsCommandError;
use crate::remote::RemoteBranchSet;
use crate::vcs::{GitCommand, VcsCommandPort};

/// Result of trying to track one remote branch locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrackingOutcome {
  /// A new local branch was created.
  Created { branch: BranchName },
  /// A local branch with that name already existed.
  AlreadyPresent { branch: BranchName },
  /// Creation failed for another reason; the failure was absorbed.
  Skipped { branch: BranchName, reason: String },
}

impl TrackingOutcome {
  pub fn branch(&self) -> &BranchName {
    match self {
      Self::Created { branch } | Self::AlreadyPresent { branch } | Self::Skipped { branch, .. } => branch,
    }
  }
}

/// Make sure every branch in `remote_branches` has a local counterpart.
///
/// Never fails. Running it twice yields `AlreadyPresent` for everything the
/// first run created.
pub async fn establish_tracking<P: VcsCommandPort>(
  port: &P,
  repo: &Path,
  remote: &str,
  remote_branches: &RemoteBranchSet,
) -> Vec<TrackingOutcome> {
  let mut outcomes = Vec::with_capacity(remote_branches.len());

  for branch in remote_branches.iter() {
    let result = GitCommand::CreateTrackingBranch { branch, remote }
      .run(port, repo)
      .await;

    let outcome = match result {
      Ok(_) => {
        debug!("Created local branch {} tracking {}", branch, branch.on_remote(remote));
        TrackingOutcome::Created { branch: branch.clone() }
      }
      Err(err) if is_already_exists(&err) => TrackingOutcome::AlreadyPresent { branch: branch.clone() },
      Err(err) => {
        warn!("Could not track {} in {}: {}", branch, repo.display(), err);
        TrackingOutcome::Skipped {
          branch: branch.clone(),
          reason: err.to_string(),
        }
      }
    };
    outcomes.push(outcome);
  }

  outcomes
}

/// Names of every local branch in `repo`.
pub async fn list_local_branches<P: VcsCommandPort>(
  port: &P,
  repo: &Path,
) -> Result<HashSet<BranchName>, VcsCommandError> {
  let output = GitCommand::LocalBranches.run(port, repo).await?;
  Ok(parse_local_branches(&output))
}

/// Parse `for-each-ref --format=%(refname) refs/heads/` output.
pub fn parse_local_branches(output: &str) -> HashSet<BranchName> {
  output
    .lines()
    .filter_map(|line| line.trim().strip_prefix("refs/heads/"))
    .filter(|name| !name.is_empty())
    .map(BranchName::from)
    .collect()
}

/// Local branches implied by tracking outcomes, for when listing them fails.
pub fn tracked_locally(outcomes: &[TrackingOutcome]) -> HashSet<BranchName> {
  outcomes
    .iter()
    .filter(|outcome| !matches!(outcome, TrackingOutcome::Skipped { .. }))
    .map(|outcome| outcome.branch().clone())
    .collect()
}

fn is_already_exists(err: &VcsCommandError) -> bool {
  err.stderr().contains("already exists")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::ScriptedGit;

  fn branches(names: &[&str]) -> RemoteBranchSet {
    RemoteBranchSet {
      branches: names.iter().map(|name| BranchName::from(*name)).collect(),
      default_branch: None,
    }
  }

  #[tokio::test]
  async fn already_existing_branch_is_success() {
    let git = ScriptedGit::new().fail(
      "branch --track main origin/main",
      128,
      "fatal: a branch named 'main' already exists",
    );

    let outcomes = establish_tracking(&git, Path::new("/repo"), "origin", &branches(&["main"])).await;

    assert_eq!(outcomes, vec![TrackingOutcome::AlreadyPresent {
      branch: BranchName::from("main")
    }]);
  }

  #[tokio::test]
  async fn second_run_is_idempotent() {
    let git = ScriptedGit::new()
      .ok("branch --track feature/a origin/feature/a", "")
      .fail(
        "branch --track feature/a origin/feature/a",
        128,
        "fatal: a branch named 'feature/a' already exists",
      );
    let set = branches(&["feature/a"]);

    let first = establish_tracking(&git, Path::new("/repo"), "origin", &set).await;
    let second = establish_tracking(&git, Path::new("/repo"), "origin", &set).await;

    assert!(matches!(first[0], TrackingOutcome::Created { .. }));
    assert!(matches!(second[0], TrackingOutcome::AlreadyPresent { .. }));
  }

  #[tokio::test]
  async fn other_failures_are_swallowed() {
    let git = ScriptedGit::new()
      .fail("branch --track main origin/main", 128, "fatal: not a valid object name")
      .ok("branch --track feature/a origin/feature/a", "");

    let outcomes = establish_tracking(&git, Path::new("/repo"), "origin", &branches(&["main", "feature/a"])).await;

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(&outcomes[0], TrackingOutcome::Skipped { reason, .. } if reason.contains("not a valid object")));
    assert_eq!(outcomes[1].branch(), &BranchName::from("feature/a"));
  }

  #[test]
  fn local_branch_listing_strips_heads_prefix() {
    let names = parse_local_branches("refs/heads/main\nrefs/heads/feature/a\n\nrefs/heads/\n");

    assert_eq!(names.len(), 2);
    assert!(names.contains(&BranchName::from("main")));
    assert!(names.contains(&BranchName::from("feature/a")));
  }

  #[test]
  fn skipped_branches_have_no_local_copy() {
    let outcomes = vec![
      TrackingOutcome::Created { branch: BranchName::from("a") },
      TrackingOutcome::AlreadyPresent { branch: BranchName::from("b") },
      TrackingOutcome::Skipped {
        branch: BranchName::from("c"),
        reason: "fatal".to_string(),
      },
    ];

    let local = tracked_locally(&outcomes);

    assert_eq!(local.len(), 2);
    assert!(!local.contains(&BranchName::from("c")));
  }
}
