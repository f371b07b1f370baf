//! Clone-and-remote fixtures.
//!
//! A [`RemoteFixture`] owns a temporary directory with two halves: `repos/`
//! holds working copies (point discovery at [`RemoteFixture::root`]) and
//! `remotes/` holds the bare repositories they push to and fetch from.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::git::run_git;

pub struct RemoteFixture {
  temp_dir: TempDir,
}

impl RemoteFixture {
  pub fn new() -> Result<Self> {
    let temp_dir = TempDir::new().context("Failed to create fixture directory")?;
    fs::create_dir_all(temp_dir.path().join("repos"))?;
    fs::create_dir_all(temp_dir.path().join("remotes"))?;
    Ok(Self { temp_dir })
  }

  /// Directory holding the working copies.
  pub fn root(&self) -> PathBuf {
    self.temp_dir.path().join("repos")
  }

  /// Create a bare `origin` and a working copy cloned from it, with one
  /// commit on `main` already pushed and `origin/HEAD` pointing at it.
  pub fn add_repo(&self, name: &str) -> Result<ClonedRepo> {
    let origin = self.temp_dir.path().join("remotes").join(format!("{name}.git"));
    let work = self.root().join(name);
    fs::create_dir_all(&origin)?;
    fs::create_dir_all(&work)?;

    run_git(&origin, &["init", "--bare", "--quiet"])?;
    run_git(&origin, &["symbolic-ref", "HEAD", "refs/heads/main"])?;

    run_git(&work, &["init", "--quiet"])?;
    run_git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    run_git(&work, &["config", "user.name", "Drift Test User"])?;
    run_git(&work, &["config", "user.email", "drift-test@example.com"])?;
    run_git(&work, &["config", "commit.gpgsign", "false"])?;

    let origin_url = origin.to_string_lossy().into_owned();
    run_git(&work, &["remote", "add", "origin", &origin_url])?;

    let repo = ClonedRepo { origin, work };
    repo.commit("README.md", "initial")?;
    run_git(&repo.work, &["push", "--quiet", "-u", "origin", "main"])?;
    run_git(&repo.work, &["remote", "set-head", "origin", "-a"])?;

    Ok(repo)
  }

  /// Create a directory that has a `.git` but no remote and no commits.
  pub fn add_unborn_repo(&self, name: &str) -> Result<PathBuf> {
    let work = self.root().join(name);
    fs::create_dir_all(&work)?;
    run_git(&work, &["init", "--quiet"])?;
    Ok(work)
  }
}

/// A working copy and the bare repository it calls `origin`.
pub struct ClonedRepo {
  pub origin: PathBuf,
  pub work: PathBuf,
}

impl ClonedRepo {
  pub fn path(&self) -> &Path {
    &self.work
  }

  /// Run git in the working copy.
  pub fn git(&self, args: &[&str]) -> Result<String> {
    run_git(&self.work, args)
  }

  /// Write `file_name` and commit it on the checked-out branch.
  pub fn commit(&self, file_name: &str, content: &str) -> Result<()> {
    fs::write(self.work.join(file_name), content)?;
    self.git(&["add", file_name])?;
    self.git(&["commit", "--quiet", "-m", &format!("Update {file_name}")])?;
    Ok(())
  }

  pub fn checkout_new(&self, branch: &str) -> Result<()> {
    self.git(&["checkout", "--quiet", "-b", branch])?;
    Ok(())
  }

  pub fn checkout(&self, rev: &str) -> Result<()> {
    self.git(&["checkout", "--quiet", rev])?;
    Ok(())
  }

  /// Push `branch` to origin, setting upstream.
  pub fn push(&self, branch: &str) -> Result<()> {
    self.git(&["push", "--quiet", "-u", "origin", branch])?;
    Ok(())
  }

  pub fn reset_hard(&self, rev: &str) -> Result<()> {
    self.git(&["reset", "--quiet", "--hard", rev])?;
    Ok(())
  }

  /// List local branch names.
  pub fn local_branches(&self) -> Result<Vec<String>> {
    let output = self.git(&["for-each-ref", "--format=%(refname:short)", "refs/heads/"])?;
    Ok(output.lines().map(str::to_string).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cloned_repo_tracks_origin_main() {
    let fixture = RemoteFixture::new().unwrap();
    let repo = fixture.add_repo("svc").unwrap();

    let remote_head = repo.git(&["symbolic-ref", "refs/remotes/origin/HEAD"]).unwrap();
    assert_eq!(remote_head.trim(), "refs/remotes/origin/main");
    assert_eq!(repo.local_branches().unwrap(), vec!["main"]);
    assert!(repo.path().starts_with(fixture.root()));
  }

  #[test]
  fn pushed_branch_appears_on_origin() {
    let fixture = RemoteFixture::new().unwrap();
    let repo = fixture.add_repo("svc").unwrap();
    repo.checkout_new("feature/a").unwrap();
    repo.commit("a.txt", "a").unwrap();
    repo.push("feature/a").unwrap();

    let branches = run_git(&repo.origin, &["branch", "--list"]).unwrap();
    assert!(branches.contains("feature/a"));
  }
}
