use std::path::Path;

use anyhow::Result;
use assert_cmd::Command;
use drift_test_utils::{ClonedRepo, RemoteFixture};
use predicates::prelude::*;
use tempfile::TempDir;

/// `drift` with an isolated config home and colors off.
fn drift(config_home: &Path) -> Result<Command> {
  let mut cmd = Command::cargo_bin("drift")?;
  cmd.env("XDG_CONFIG_HOME", config_home).env_remove("RUST_LOG").arg("--colors").arg("never");
  Ok(cmd)
}

/// `feature/a` is checked out, four commits ahead of main on the remote and
/// one commit behind its own remote branch locally.
fn stale_feature_fixture() -> Result<(RemoteFixture, ClonedRepo)> {
  let fixture = RemoteFixture::new()?;
  let repo = fixture.add_repo("service")?;
  repo.checkout_new("feature/a")?;
  for n in 0..4 {
    repo.commit(&format!("a{n}.txt"), "change")?;
  }
  repo.push("feature/a")?;
  repo.reset_hard("HEAD~1")?;
  Ok((fixture, repo))
}

#[test]
fn test_help_lists_options() -> Result<()> {
  let config_home = TempDir::new()?;
  drift(config_home.path())?
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("--format"))
    .stdout(predicate::str::contains("--no-track"))
    .stdout(predicate::str::contains("--trunk"));
  Ok(())
}

#[test]
fn test_text_report_narrates_stale_branch() -> Result<()> {
  let config_home = TempDir::new()?;
  let (fixture, _repo) = stale_feature_fixture()?;

  drift(config_home.path())?
    .arg(fixture.root())
    .assert()
    .success()
    .stdout(predicate::str::contains("On branch feature/a"))
    .stdout(predicate::str::contains(
      "feature/a (current) is behind remote for 1 commit",
    ))
    .stdout(predicate::str::contains(
      "feature/a (current) is ahead of trunk for 4 commits",
    ))
    .stdout(predicate::str::contains("Summary"))
    .stdout(predicate::str::contains("1 repositories audited, 1 with stale branches, 0 failed"));
  Ok(())
}

#[test]
fn test_json_report() -> Result<()> {
  let config_home = TempDir::new()?;
  let (fixture, _repo) = stale_feature_fixture()?;

  let output = drift(config_home.path())?
    .arg(fixture.root())
    .args(["--format", "json"])
    .output()?;
  assert!(output.status.success());

  let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let repo = &value["repositories"][0];
  assert_eq!(repo["name"], "service");
  assert_eq!(repo["trunk"], "main");
  assert_eq!(repo["current_branch"]["name"], "feature/a");
  assert_eq!(repo["severity"], "warn");

  let branches = repo["branches"].as_array().unwrap();
  let feature = branches.iter().find(|b| b["branch"] == "feature/a").unwrap();
  assert_eq!(feature["divergence"]["behind_remote"], 1);
  assert_eq!(feature["divergence"]["ahead_of_trunk"], 4);
  assert_eq!(feature["divergence"]["behind_trunk"], 0);

  let main = branches.iter().find(|b| b["branch"] == "main").unwrap();
  assert_eq!(main["divergence"]["is_trunk"], true);
  assert!(main["divergence"]["ahead_of_trunk"].is_null());
  Ok(())
}

#[test]
fn test_trunk_flag_overrides_remote_head() -> Result<()> {
  let config_home = TempDir::new()?;
  let (fixture, _repo) = stale_feature_fixture()?;

  let output = drift(config_home.path())?
    .arg(fixture.root())
    .args(["--format", "json", "--trunk", "feature/a"])
    .output()?;

  let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(value["repositories"][0]["trunk"], "feature/a");
  Ok(())
}

#[test]
fn test_no_track_leaves_branches_alone() -> Result<()> {
  let config_home = TempDir::new()?;
  let fixture = RemoteFixture::new()?;
  let repo = fixture.add_repo("service")?;
  repo.checkout_new("feature/b")?;
  repo.commit("b.txt", "b")?;
  repo.push("feature/b")?;
  repo.checkout("main")?;
  repo.git(&["branch", "-D", "feature/b"])?;

  let output = drift(config_home.path())?
    .arg(fixture.root())
    .args(["--no-track", "--format", "json"])
    .output()?;
  assert!(output.status.success());
  assert_eq!(repo.local_branches()?, vec!["main"]);

  // Without a local copy the branch is still compared to trunk.
  let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let branches = value["repositories"][0]["branches"].as_array().unwrap();
  let feature = branches.iter().find(|b| b["branch"] == "feature/b").unwrap();
  assert_eq!(feature["divergence"]["ahead_of_trunk"], 1);
  assert_eq!(feature["divergence"]["behind_remote"], 0);

  drift(config_home.path())?
    .arg(fixture.root())
    .assert()
    .success()
    .stdout(predicate::str::contains("Created tracking branch feature/b"));
  assert!(repo.local_branches()?.contains(&"feature/b".to_string()));
  Ok(())
}

#[test]
fn test_repository_failure_sets_exit_code() -> Result<()> {
  let config_home = TempDir::new()?;
  let fixture = RemoteFixture::new()?;
  fixture.add_unborn_repo("empty")?;
  fixture.add_repo("service")?;

  drift(config_home.path())?
    .arg(fixture.root())
    .assert()
    .code(1)
    .stdout(predicate::str::contains("1 failed"))
    .stderr(predicate::str::contains("empty: failed to query the current branch"));
  Ok(())
}

#[test]
fn test_missing_config_file_is_a_usage_error() -> Result<()> {
  let config_home = TempDir::new()?;
  let missing = config_home.path().join("missing.toml");

  drift(config_home.path())?
    .arg(config_home.path())
    .arg("--config")
    .arg(&missing)
    .assert()
    .code(2)
    .stderr(predicate::str::contains("does not exist"));
  Ok(())
}

#[test]
fn test_config_file_remote_is_used() -> Result<()> {
  let config_home = TempDir::new()?;
  let drift_dir = config_home.path().join("drift");
  std::fs::create_dir_all(&drift_dir)?;
  std::fs::write(drift_dir.join("config.toml"), "remote = \"upstream\"\n")?;
  let (fixture, _repo) = stale_feature_fixture()?;

  // Nothing lives under upstream/*, so there is nothing to compare.
  let output = drift(config_home.path())?
    .arg(fixture.root())
    .args(["--format", "json"])
    .output()?;
  assert!(output.status.success());

  let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(value["repositories"][0]["branches"].as_array().map(Vec::len), Some(0));
  assert_eq!(value["repositories"][0]["current_branch_on_remote"], false);
  Ok(())
}

#[test]
fn test_empty_root() -> Result<()> {
  let config_home = TempDir::new()?;
  let root = TempDir::new()?;

  drift(config_home.path())?
    .arg(root.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("No git repositories found"));
  Ok(())
}
