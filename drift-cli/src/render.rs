//! # Report Rendering
//!
//! Console narration of audit events, the end-of-run summary table, and the
//! JSON document printed for `--format json`.

use anyhow::{Context, Result};
use drift_core::{
  AuditEvent, AuditObserver, BranchName, BranchReport, CurrentBranch, DivergenceReport, RemoteStatus,
  RepositoryPath, RepositoryReport, ResolutionStrategy, Severity, TrackingOutcome, TrunkStatus,
};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::output::{
  commits, format_branch, format_repo_name, format_repo_path, print_error, print_header, print_info, print_notice,
  print_success, print_warning,
};

/// Observer that narrates a run on the terminal.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
  pub fn new() -> Self {
    Self
  }
}

impl AuditObserver for ConsoleReporter {
  fn notify(&mut self, event: &AuditEvent<'_>) {
    match event {
      AuditEvent::FleetStarted { total: 0 } => print_warning("No git repositories found"),
      AuditEvent::FleetStarted { total } => print_info(&format!("Auditing {total} repositories")),
      AuditEvent::RepositoryStarted { path, index, total } => {
        print_header(&format!("[{}/{}] {}", index + 1, total, format_repo_name(&path.name())));
        println!("  {}", format_repo_path(&path.to_string()));
      }
      AuditEvent::RemoteBranchesEnumerated { branches, .. } => {
        if branches.is_empty() {
          print_info("No remote branches");
        }
      }
      AuditEvent::TrackingEstablished { outcomes, .. } => {
        for outcome in outcomes.iter() {
          match outcome {
            TrackingOutcome::Created { branch } => {
              print_success(&format!("Created tracking branch {}", format_branch(branch.as_str())))
            }
            TrackingOutcome::Skipped { branch, reason } => print_warning(&format!(
              "Could not create tracking branch {}: {}",
              format_branch(branch.as_str()),
              reason
            )),
            TrackingOutcome::AlreadyPresent { .. } => {}
          }
        }
      }
      AuditEvent::CurrentBranchResolved { current, .. } => print_info(&describe_current(current)),
      AuditEvent::BranchAudited { report, .. } => match &report.outcome {
        Ok(divergence) => {
          for (severity, line) in describe_divergence(&report.branch, report.is_current, divergence) {
            print_finding(severity, &line);
          }
        }
        Err(err) => print_error(&format!("Could not compare {}: {}", format_branch(report.branch.as_str()), err)),
      },
      AuditEvent::RepositoryFailed { path, error } => print_error(&format!("{}: {}", path.name(), error)),
      AuditEvent::RepositoryFinished { report } => {
        if let Some(current) = report.current_branch_name().filter(|_| !report.current_branch_on_remote()) {
          print_warning(&format!(
            "Current branch {} does not exist on the remote",
            format_branch(current.as_str())
          ));
        }
      }
      AuditEvent::FleetFinished { reports } => print_summary(reports),
    }
  }
}

fn print_finding(severity: Severity, line: &str) {
  match severity {
    Severity::Warn => print_warning(line),
    Severity::Notice => print_notice(line),
    Severity::Info => print_info(line),
  }
}

fn describe_current(current: &CurrentBranch) -> String {
  match current.strategy {
    ResolutionStrategy::Decoration => format!("On branch {}", format_branch(current.name.as_str())),
    ResolutionStrategy::Containment => format!(
      "On branch {} (inferred from branches containing HEAD)",
      format_branch(current.name.as_str())
    ),
  }
}

/// One line per finding for a compared branch, loudest first.
pub fn describe_divergence(branch: &BranchName, is_current: bool, report: &DivergenceReport) -> Vec<(Severity, String)> {
  let name = if is_current {
    format!("{} (current)", format_branch(branch.as_str()))
  } else {
    format_branch(branch.as_str())
  };

  let mut lines = Vec::new();
  if let RemoteStatus::Behind(behind) = report.remote_status() {
    lines.push((
      report.remote_severity(is_current),
      format!("{name} is behind remote for {}", commits(behind)),
    ));
  }
  if report.ahead_of_remote > 0 {
    lines.push((
      Severity::Info,
      format!("{name} has {} not on the remote", commits(report.ahead_of_remote)),
    ));
  }

  match report.trunk_status() {
    TrunkStatus::IsTrunk => {}
    TrunkStatus::Behind { behind, ahead } => {
      lines.push((
        report.trunk_severity(is_current),
        format!("{name} is behind trunk for {}", commits(behind)),
      ));
      if ahead > 0 {
        lines.push((Severity::Info, format!("{name} is ahead of trunk for {}", commits(ahead))));
      }
    }
    TrunkStatus::Ahead(ahead) if ahead > 0 => {
      lines.push((Severity::Info, format!("{name} is ahead of trunk for {}", commits(ahead))));
    }
    TrunkStatus::Ahead(_) => {}
  }

  if lines.is_empty() {
    lines.push((Severity::Info, format!("{name} is up to date")));
  }
  lines.sort_by(|a, b| b.0.cmp(&a.0));
  lines
}

/// A row of the end-of-run summary table.
#[derive(Debug, Tabled)]
pub struct SummaryRow {
  #[tabled(rename = "Repository")]
  pub repository: String,
  #[tabled(rename = "Current")]
  pub current: String,
  #[tabled(rename = "Branches")]
  pub branches: usize,
  #[tabled(rename = "Stale")]
  pub stale: usize,
  #[tabled(rename = "Errors")]
  pub errors: usize,
  #[tabled(rename = "Status")]
  pub status: String,
}

impl SummaryRow {
  pub fn from_report(report: &RepositoryReport) -> Self {
    let status = match &report.failure {
      Some(err) => format!("failed: {err}"),
      None => match report.severity() {
        Severity::Warn => "stale (current)".to_string(),
        Severity::Notice => "stale".to_string(),
        Severity::Info => "ok".to_string(),
      },
    };

    Self {
      repository: report.path.name(),
      current: report
        .current_branch_name()
        .map(|name| name.to_string())
        .unwrap_or_else(|| "-".to_string()),
      branches: report.branches.len(),
      stale: report.stale_branches().count(),
      errors: report.failed_branches().count(),
      status,
    }
  }
}

fn print_summary(reports: &[RepositoryReport]) {
  if reports.is_empty() {
    return;
  }

  print_header("Summary");
  let rows: Vec<SummaryRow> = reports.iter().map(SummaryRow::from_report).collect();
  println!("{}", Table::new(rows).with(Style::sharp()));

  let failed = reports.iter().filter(|report| !report.is_complete()).count();
  let stale = reports.iter().filter(|report| report.stale_branches().next().is_some()).count();
  let line = format!(
    "{} repositories audited, {} with stale branches, {} failed",
    reports.len(),
    stale,
    failed
  );
  if failed > 0 {
    print_error(&line);
  } else if stale > 0 {
    print_warning(&line);
  } else {
    print_success(&line);
  }
}

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
  repositories: Vec<RepositoryView<'a>>,
  summary: SummaryView,
}

#[derive(Debug, Serialize)]
struct RepositoryView<'a> {
  path: &'a RepositoryPath,
  name: String,
  current_branch: Option<&'a CurrentBranch>,
  current_branch_on_remote: bool,
  trunk: Option<&'a BranchName>,
  remote_default_branch: Option<&'a BranchName>,
  tracking: &'a [TrackingOutcome],
  branches: Vec<BranchView<'a>>,
  severity: Severity,
  error: Option<String>,
}

#[derive(Debug, Serialize)]
struct BranchView<'a> {
  branch: &'a BranchName,
  is_current: bool,
  divergence: Option<&'a DivergenceReport>,
  severity: Option<Severity>,
  error: Option<String>,
}

#[derive(Debug, Serialize)]
struct SummaryView {
  repositories: usize,
  failed: usize,
  stale_branches: usize,
}

impl<'a> From<&'a BranchReport> for BranchView<'a> {
  fn from(report: &'a BranchReport) -> Self {
    Self {
      branch: &report.branch,
      is_current: report.is_current,
      divergence: report.divergence(),
      severity: report.severity(),
      error: report.error().map(ToString::to_string),
    }
  }
}

impl<'a> From<&'a RepositoryReport> for RepositoryView<'a> {
  fn from(report: &'a RepositoryReport) -> Self {
    Self {
      path: &report.path,
      name: report.path.name(),
      current_branch: report.current_branch.as_ref(),
      current_branch_on_remote: report.current_branch_on_remote(),
      trunk: report.trunk.as_ref(),
      remote_default_branch: report.remote_branches.default_branch.as_ref(),
      tracking: &report.tracking,
      branches: report.branches.iter().map(BranchView::from).collect(),
      severity: report.severity(),
      error: report.failure.as_ref().map(ToString::to_string),
    }
  }
}

/// Pretty-printed JSON for a finished run.
pub fn render_json(reports: &[RepositoryReport]) -> Result<String> {
  let document = JsonDocument {
    repositories: reports.iter().map(RepositoryView::from).collect(),
    summary: SummaryView {
      repositories: reports.len(),
      failed: reports.iter().filter(|report| !report.is_complete()).count(),
      stale_branches: reports.iter().map(|report| report.stale_branches().count()).sum(),
    },
  };
  serde_json::to_string_pretty(&document).context("Failed to serialize audit reports")
}
