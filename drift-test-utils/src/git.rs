//! Git repository management for testing
//!
//! Temporary repositories built with git2, plus a thin wrapper for running
//! the git binary when a test needs porcelain behaviour (push, fetch, reset).

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Result, bail};
use git2::{Repository, Signature};
use tempfile::TempDir;

/// A temporary git repository whose HEAD points at an unborn `main` branch.
/// The directory is removed when the guard is dropped.
pub struct GitRepoTestGuard {
  /// The temporary directory containing the git repository
  pub temp_dir: TempDir,
  /// The git repository
  pub repo: Repository,
}

impl GitRepoTestGuard {
  /// Create a new test git repository
  pub fn new() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let temp_path = temp_dir.path();

    let repo = Repository::init(temp_path).expect("Failed to initialize git repository");

    // Independent of the user's init.defaultBranch.
    repo.set_head("refs/heads/main").expect("Failed to point HEAD at main");

    let mut config = repo.config().expect("Failed to get repository config");
    config
      .set_str("user.name", "Drift Test User")
      .expect("Failed to set user.name");
    config
      .set_str("user.email", "drift-test@example.com")
      .expect("Failed to set user.email");
    config
      .set_bool("commit.gpgsign", false)
      .expect("Failed to disable commit signing");

    assert!(
      temp_path.join(".git").exists(),
      "Git repository was not properly initialized"
    );

    Self { temp_dir, repo }
  }

  /// Get the path to the git repository
  pub fn path(&self) -> &Path {
    self.temp_dir.path()
  }
}

impl Default for GitRepoTestGuard {
  fn default() -> Self {
    Self::new()
  }
}

/// Helper function to create a commit on HEAD in a repository
pub fn create_commit(repo: &Repository, file_name: &str, content: &str, message: &str) -> Result<()> {
  let Some(repo_path) = repo.workdir() else {
    bail!("Cannot commit in a bare repository");
  };
  fs::write(repo_path.join(file_name), content)?;

  let mut index = repo.index()?;
  index.add_path(Path::new(file_name))?;
  index.write()?;

  let tree_id = index.write_tree()?;
  let tree = repo.find_tree(tree_id)?;

  let signature = Signature::now("Test User", "test@example.com")?;

  match repo.head().ok().and_then(|head| head.peel_to_commit().ok()) {
    Some(parent) => repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?,
    None => repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &[])?,
  };

  Ok(())
}

/// Run the git binary in `dir` and return its stdout, failing with stderr
/// when git exits non-zero.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
  let output = Command::new("git")
    .args(args)
    .current_dir(dir)
    .env("GIT_CONFIG_NOSYSTEM", "1")
    .env("GIT_TERMINAL_PROMPT", "0")
    .output()?;

  if !output.status.success() {
    bail!(
      "git {} failed in {}: {}",
      args.join(" "),
      dir.display(),
      String::from_utf8_lossy(&output.stderr).trim()
    );
  }

  Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
