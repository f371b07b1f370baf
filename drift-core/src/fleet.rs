//! # Fleet Runner
//!
//! Drives [`RepositoryAuditor`] over many repositories, strictly one after
//! another. Sequential execution keeps narration ordered and bounds the
//! number of git processes to one. A failed repository is recorded in its
//! report and the runner moves on.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tracing::info;

use crate::audit::RepositoryAuditor;
use crate::branch::RepositoryPath;
use crate::config::AuditConfig;
use crate::discovery::discover_repositories;
use crate::error::AuditError;
use crate::events::{AuditEvent, AuditObserver};
use crate::report::RepositoryReport;
use crate::vcs::VcsCommandPort;

/// Shared stop signal, checked between repositories and between branches.
///
/// A git command already running is allowed to finish; interrupting it could
/// leave the working copy half-updated.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

/// Audits a set of repositories with one command port.
pub struct FleetRunner<P> {
  port: P,
  config: AuditConfig,
  cancel: CancellationFlag,
}

impl<P: VcsCommandPort> FleetRunner<P> {
  pub fn new(port: P, config: AuditConfig) -> Self {
    Self {
      port,
      config,
      cancel: CancellationFlag::new(),
    }
  }

  /// Use an externally owned cancellation flag (e.g. one set on Ctrl-C).
  pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
    self.cancel = cancel;
    self
  }

  pub fn cancellation(&self) -> CancellationFlag {
    self.cancel.clone()
  }

  /// Audit every repository in order, each one completed before the next
  /// begins. Always returns one report per input path.
  ///
  /// Once cancelled, remaining repositories are reported as
  /// [`AuditError::Cancelled`] without running any command.
  pub async fn run_audit(
    &self,
    repositories: &[RepositoryPath],
    observer: &mut dyn AuditObserver,
  ) -> Vec<RepositoryReport> {
    let total = repositories.len();
    observer.notify(&AuditEvent::FleetStarted { total });

    let auditor = RepositoryAuditor::new(&self.port, &self.config, &self.cancel);
    let mut reports = Vec::with_capacity(total);

    for (index, path) in repositories.iter().enumerate() {
      if self.cancel.is_cancelled() {
        info!("Cancelled; skipping {}", path);
        reports.push(RepositoryReport::failed(path.clone(), AuditError::Cancelled));
        continue;
      }

      observer.notify(&AuditEvent::RepositoryStarted { path, index, total });
      reports.push(auditor.audit(path, observer).await);
    }

    observer.notify(&AuditEvent::FleetFinished { reports: &reports });
    reports
  }

  /// Discover repositories under `root` and audit them all.
  pub async fn audit_root(&self, root: &Path, observer: &mut dyn AuditObserver) -> Result<Vec<RepositoryReport>> {
    let repositories = discover_repositories(root, self.config.max_depth)?;
    info!("Found {} repositories under {}", repositories.len(), root.display());
    Ok(self.run_audit(&repositories, observer).await)
  }
}

/// Discover and audit every repository under `root` with the given port.
pub async fn run_audit<P: VcsCommandPort>(
  port: P,
  root: &Path,
  config: AuditConfig,
  observer: &mut dyn AuditObserver,
) -> Result<Vec<RepositoryReport>> {
  FleetRunner::new(port, config).audit_root(root, observer).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::events::SilentObserver;
  use crate::testing::ScriptedGit;

  const FETCH: &str = "fetch --all --prune";
  const LIST: &str = "branch -r --no-color --list origin/*";
  const DECORATE: &str = "show -s --decorate=full --pretty=%d HEAD";
  const LOCALS: &str = "for-each-ref --format=%(refname) refs/heads/";

  fn paths() -> Vec<RepositoryPath> {
    ["/fleet/one", "/fleet/two", "/fleet/three"]
      .into_iter()
      .map(RepositoryPath::new)
      .collect()
  }

  fn healthy_git() -> ScriptedGit {
    ScriptedGit::new()
      .ok(FETCH, "")
      .ok(LIST, "origin/master\n")
      .ok(DECORATE, " (HEAD -> refs/heads/master, refs/remotes/origin/master)")
      .ok(LOCALS, "refs/heads/master\n")
      .ok("rev-list --left-right --count HEAD...origin/master", "0\t0\n")
  }

  #[tokio::test]
  async fn failing_repository_is_isolated() {
    let git = healthy_git().fail_in("/fleet/two", LIST, 128, "fatal: bad object");
    let runner = FleetRunner::new(
      &git,
      AuditConfig {
        establish_tracking: false,
        ..Default::default()
      },
    );

    let reports = runner.run_audit(&paths(), &mut SilentObserver).await;

    assert_eq!(reports.len(), 3);
    assert!(reports[0].is_complete());
    assert_eq!(reports[0].branches.len(), 1);

    assert!(matches!(reports[1].failure, Some(AuditError::Enumerate(_))));
    assert!(reports[1].branches.is_empty());

    assert!(reports[2].is_complete());
    assert_eq!(reports[2].branches.len(), 1);
  }

  #[tokio::test]
  async fn repositories_are_processed_one_at_a_time() {
    let git = healthy_git();
    let runner = FleetRunner::new(
      &git,
      AuditConfig {
        establish_tracking: false,
        ..Default::default()
      },
    );

    runner.run_audit(&paths(), &mut SilentObserver).await;

    // Each repository's commands form one contiguous block.
    let per_repo = git.commands_in("/fleet/one").len();
    assert_eq!(per_repo, 5);
    let commands = git.commands();
    assert_eq!(commands.len(), per_repo * 3);
    for chunk in commands.chunks(per_repo) {
      assert_eq!(chunk[0], FETCH);
    }
  }

  #[tokio::test]
  async fn cancellation_skips_remaining_repositories() {
    let git = healthy_git();
    let runner = FleetRunner::new(&git, AuditConfig::default());
    let cancel = runner.cancellation();

    // Cancel as soon as the first repository finishes.
    let mut observer = CancelAfterFirst(cancel);
    let reports = runner.run_audit(&paths(), &mut observer).await;

    assert_eq!(reports.len(), 3);
    assert!(reports[0].is_complete());
    assert!(matches!(reports[1].failure, Some(AuditError::Cancelled)));
    assert!(matches!(reports[2].failure, Some(AuditError::Cancelled)));
    assert!(git.commands_in("/fleet/two").is_empty());
  }

  struct CancelAfterFirst(CancellationFlag);

  impl AuditObserver for CancelAfterFirst {
    fn notify(&mut self, event: &AuditEvent<'_>) {
      if let AuditEvent::RepositoryFinished { .. } = event {
        self.0.cancel();
      }
    }
  }
}
