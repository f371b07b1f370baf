//! # Repository Audit
//!
//! Runs the per-repository pipeline: enumerate remote branches, establish
//! tracking branches, resolve the current branch, then compute divergence for
//! every remote branch. The steps always run in that order and one at a
//! time.

use tracing::{info, warn};

use crate::branch::RepositoryPath;
use crate::config::AuditConfig;
use crate::divergence::{DivergenceQuery, compute_divergence};
use crate::error::AuditError;
use crate::events::{AuditEvent, AuditObserver};
use crate::fleet::CancellationFlag;
use crate::remote::enumerate_remote_branches;
use crate::report::{BranchReport, RepositoryReport};
use crate::resolver::{ResolveContext, resolve_current_branch};
use crate::tracking::{establish_tracking, list_local_branches, tracked_locally};
use crate::vcs::VcsCommandPort;

/// Audits a single repository.
pub struct RepositoryAuditor<'a, P> {
  port: &'a P,
  config: &'a AuditConfig,
  cancel: &'a CancellationFlag,
}

impl<'a, P: VcsCommandPort> RepositoryAuditor<'a, P> {
  pub fn new(port: &'a P, config: &'a AuditConfig, cancel: &'a CancellationFlag) -> Self {
    Self { port, config, cancel }
  }

  /// Audit `path`. Never fails: an error that ends the audit is stored in
  /// [`RepositoryReport::failure`] next to whatever was learned before it.
  pub async fn audit(&self, path: &RepositoryPath, observer: &mut dyn AuditObserver) -> RepositoryReport {
    let mut report = RepositoryReport::new(path.clone());

    let result = if self.cancel.is_cancelled() {
      Err(AuditError::Cancelled)
    } else {
      self.run(&mut report, observer).await
    };

    if let Err(error) = result {
      warn!("Audit of {} stopped: {}", path, error);
      observer.notify(&AuditEvent::RepositoryFailed { path, error: &error });
      report.failure = Some(error);
    }

    observer.notify(&AuditEvent::RepositoryFinished { report: &report });
    report
  }

  async fn run(&self, report: &mut RepositoryReport, observer: &mut dyn AuditObserver) -> Result<(), AuditError> {
    let path = report.path.clone();
    let repo = path.as_path();
    let remote = self.config.remote.as_str();

    report.remote_branches = enumerate_remote_branches(self.port, repo, remote).await?;
    observer.notify(&AuditEvent::RemoteBranchesEnumerated {
      path: &path,
      branches: &report.remote_branches,
    });

    let trunk = self.config.resolve_trunk(&report.remote_branches);
    report.trunk = Some(trunk.clone());

    if self.config.establish_tracking {
      report.tracking = establish_tracking(self.port, repo, remote, &report.remote_branches).await;
      observer.notify(&AuditEvent::TrackingEstablished {
        path: &path,
        outcomes: &report.tracking,
      });
    }

    let context = ResolveContext {
      remote,
      trunk: trunk.as_str(),
    };
    let current = resolve_current_branch(self.port, repo, &context).await?;
    observer.notify(&AuditEvent::CurrentBranchResolved {
      path: &path,
      current: &current,
    });
    report.current_branch = Some(current.clone());

    info!(
      "Auditing {} branches in {} (current: {}, trunk: {})",
      report.remote_branches.len(),
      path,
      current.name,
      trunk
    );

    let local_branches = match list_local_branches(self.port, repo).await {
      Ok(names) => names,
      Err(err) => {
        warn!("Could not list local branches of {}: {}", path, err);
        tracked_locally(&report.tracking)
      }
    };

    let branches = report.remote_branches.branches.clone();
    for branch in &branches {
      if self.cancel.is_cancelled() {
        return Err(AuditError::Cancelled);
      }

      let is_current = *branch == current.name;
      let query = DivergenceQuery {
        branch,
        trunk: &trunk,
        remote,
        is_current,
        has_local: local_branches.contains(branch),
      };
      let outcome = compute_divergence(self.port, repo, &query).await;
      if let Err(err) = &outcome {
        warn!("Could not compute divergence of {} in {}: {}", branch, path, err);
      }

      let branch_report = BranchReport {
        branch: branch.clone(),
        is_current,
        outcome,
      };
      observer.notify(&AuditEvent::BranchAudited {
        path: &path,
        report: &branch_report,
      });
      report.branches.push(branch_report);
    }

    Ok(())
  }
}
