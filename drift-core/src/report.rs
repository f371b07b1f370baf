//! Structured results of an audit run.
//!
//! Reports are plain values handed to whatever renders them. Failures are
//! attached to the entity they affect: a branch keeps its own error, a
//! repository keeps the error that ended its audit.

use crate::branch::{BranchName, RepositoryPath};
use crate::divergence::{DivergenceReport, Severity};
use crate::error::{AuditError, VcsCommandError};
use crate::remote::RemoteBranchSet;
use crate::resolver::CurrentBranch;
use crate::tracking::TrackingOutcome;

/// Divergence of one remote branch, or the reason it could not be computed.
#[derive(Debug, Clone)]
pub struct BranchReport {
  pub branch: BranchName,
  /// Whether this is the repository's current branch.
  pub is_current: bool,
  pub outcome: Result<DivergenceReport, VcsCommandError>,
}

impl BranchReport {
  pub fn divergence(&self) -> Option<&DivergenceReport> {
    self.outcome.as_ref().ok()
  }

  pub fn error(&self) -> Option<&VcsCommandError> {
    self.outcome.as_ref().err()
  }

  /// Severity of the branch's findings; failed branches report `None`.
  pub fn severity(&self) -> Option<Severity> {
    self.divergence().map(|report| report.severity(self.is_current))
  }
}

/// Everything learned about one repository during a run.
#[derive(Debug, Clone)]
pub struct RepositoryReport {
  pub path: RepositoryPath,
  /// Unset when the audit stopped before (or while) resolving it.
  pub current_branch: Option<CurrentBranch>,
  /// Trunk the branches were compared against, once known.
  pub trunk: Option<BranchName>,
  pub remote_branches: RemoteBranchSet,
  pub tracking: Vec<TrackingOutcome>,
  pub branches: Vec<BranchReport>,
  /// Error that ended this repository's audit early.
  pub failure: Option<AuditError>,
}

impl RepositoryReport {
  pub fn new(path: RepositoryPath) -> Self {
    Self {
      path,
      current_branch: None,
      trunk: None,
      remote_branches: RemoteBranchSet::default(),
      tracking: Vec::new(),
      branches: Vec::new(),
      failure: None,
    }
  }

  /// Report for a repository that was never started.
  pub fn failed(path: RepositoryPath, failure: AuditError) -> Self {
    Self {
      failure: Some(failure),
      ..Self::new(path)
    }
  }

  pub fn is_complete(&self) -> bool {
    self.failure.is_none()
  }

  pub fn current_branch_name(&self) -> Option<&BranchName> {
    self.current_branch.as_ref().map(|current| &current.name)
  }

  /// The entry for the current branch, if it exists on the remote.
  pub fn current_branch_report(&self) -> Option<&BranchReport> {
    self.branches.iter().find(|report| report.is_current)
  }

  /// `false` when the current branch is known but has no remote counterpart.
  pub fn current_branch_on_remote(&self) -> bool {
    match self.current_branch_name() {
      Some(name) => self.remote_branches.contains(name),
      None => true,
    }
  }

  pub fn failed_branches(&self) -> impl Iterator<Item = &BranchReport> {
    self.branches.iter().filter(|report| report.outcome.is_err())
  }

  pub fn stale_branches(&self) -> impl Iterator<Item = &BranchReport> {
    self
      .branches
      .iter()
      .filter(|report| report.divergence().is_some_and(DivergenceReport::is_stale))
  }

  /// Loudest severity among the computed branches.
  pub fn severity(&self) -> Severity {
    self
      .branches
      .iter()
      .filter_map(BranchReport::severity)
      .max()
      .unwrap_or(Severity::Info)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resolver::ResolutionStrategy;

  fn branch(name: &str, is_current: bool, behind_remote: u64) -> BranchReport {
    BranchReport {
      branch: BranchName::from(name),
      is_current,
      outcome: Ok(DivergenceReport {
        behind_remote,
        ahead_of_trunk: Some(0),
        behind_trunk: Some(0),
        ..Default::default()
      }),
    }
  }

  #[test]
  fn severity_is_loudest_branch() {
    let mut report = RepositoryReport::new(RepositoryPath::new("/repo"));
    report.branches = vec![branch("a", false, 0), branch("b", false, 3)];
    assert_eq!(report.severity(), Severity::Notice);

    report.branches.push(branch("c", true, 1));
    assert_eq!(report.severity(), Severity::Warn);
    assert_eq!(report.stale_branches().count(), 2);
  }

  #[test]
  fn current_branch_without_remote_is_detected() {
    let mut report = RepositoryReport::new(RepositoryPath::new("/repo"));
    report.remote_branches.branches = vec![BranchName::from("main")];
    report.current_branch = Some(CurrentBranch {
      name: BranchName::from("local-only"),
      strategy: ResolutionStrategy::Decoration,
    });

    assert!(!report.current_branch_on_remote());
    assert!(report.current_branch_report().is_none());
  }

  #[test]
  fn failed_report_has_no_entries() {
    let report = RepositoryReport::failed(RepositoryPath::new("/repo"), AuditError::Cancelled);

    assert!(!report.is_complete());
    assert!(report.branches.is_empty());
    assert!(report.current_branch.is_none());
  }
}
