//! Narration hooks.
//!
//! The engine performs no console output. Progress is published as
//! [`AuditEvent`]s to an [`AuditObserver`] supplied by the caller, which
//! decides how (or whether) to render it.

use crate::branch::RepositoryPath;
use crate::error::AuditError;
use crate::remote::RemoteBranchSet;
use crate::report::{BranchReport, RepositoryReport};
use crate::resolver::CurrentBranch;
use crate::tracking::TrackingOutcome;

/// A point of progress during a run, in the order they occur.
#[derive(Debug)]
pub enum AuditEvent<'a> {
  FleetStarted {
    total: usize,
  },
  /// `index` is zero-based.
  RepositoryStarted {
    path: &'a RepositoryPath,
    index: usize,
    total: usize,
  },
  RemoteBranchesEnumerated {
    path: &'a RepositoryPath,
    branches: &'a RemoteBranchSet,
  },
  TrackingEstablished {
    path: &'a RepositoryPath,
    outcomes: &'a [TrackingOutcome],
  },
  CurrentBranchResolved {
    path: &'a RepositoryPath,
    current: &'a CurrentBranch,
  },
  /// Emitted for failed branches too; inspect `report.outcome`.
  BranchAudited {
    path: &'a RepositoryPath,
    report: &'a BranchReport,
  },
  RepositoryFailed {
    path: &'a RepositoryPath,
    error: &'a AuditError,
  },
  RepositoryFinished {
    report: &'a RepositoryReport,
  },
  FleetFinished {
    reports: &'a [RepositoryReport],
  },
}

impl AuditEvent<'_> {
  /// Short stable name, useful for logging and tests.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::FleetStarted { .. } => "fleet_started",
      Self::RepositoryStarted { .. } => "repository_started",
      Self::RemoteBranchesEnumerated { .. } => "remote_branches_enumerated",
      Self::TrackingEstablished { .. } => "tracking_established",
      Self::CurrentBranchResolved { .. } => "current_branch_resolved",
      Self::BranchAudited { .. } => "branch_audited",
      Self::RepositoryFailed { .. } => "repository_failed",
      Self::RepositoryFinished { .. } => "repository_finished",
      Self::FleetFinished { .. } => "fleet_finished",
    }
  }
}

/// Receives [`AuditEvent`]s as a run progresses.
pub trait AuditObserver {
  fn notify(&mut self, event: &AuditEvent<'_>);
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl AuditObserver for SilentObserver {
  fn notify(&mut self, _event: &AuditEvent<'_>) {}
}

impl<F> AuditObserver for F
where
  F: FnMut(&AuditEvent<'_>),
{
  fn notify(&mut self, event: &AuditEvent<'_>) {
    self(event);
  }
}
