//! # Configuration Management
//!
//! Locates and parses the optional `config.toml` under the user's config
//! directory (XDG on Linux). Every field has a default, so an absent file is
//! the same as an empty one.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::branch::BranchName;
use crate::consts;
use crate::remote::RemoteBranchSet;
use crate::vcs::GitCli;

/// Represents the configuration directories for drift
#[derive(Debug, Clone)]
pub struct ConfigDirs {
  pub config_dir: PathBuf,
}

impl ConfigDirs {
  /// Create a new ConfigDirs instance
  pub fn new() -> Result<Self> {
    let proj_dirs = ProjectDirs::from("", "", "drift").context("Failed to determine project directories")?;

    Ok(Self {
      config_dir: proj_dirs.config_dir().to_path_buf(),
    })
  }

  /// Get the path to the configuration file
  pub fn config_path(&self) -> PathBuf {
    self.config_dir.join("config.toml")
  }
}

/// Settings for an audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
  /// Remote whose branches are audited.
  pub remote: String,
  /// Trunk branch. When unset, the remote's default branch is used.
  pub trunk_branch: Option<String>,
  /// Seconds a single git command may run before it counts as failed.
  pub command_timeout_secs: u64,
  /// Create local tracking branches for remote branches.
  pub establish_tracking: bool,
  /// How deep below the root to look for repositories. Unlimited when unset.
  pub max_depth: Option<usize>,
  /// Git binary to invoke.
  pub git_executable: String,
}

impl Default for AuditConfig {
  fn default() -> Self {
    Self {
      remote: consts::DEFAULT_REMOTE.to_string(),
      trunk_branch: None,
      command_timeout_secs: consts::DEFAULT_COMMAND_TIMEOUT.as_secs(),
      establish_tracking: true,
      max_depth: None,
      git_executable: consts::GIT_EXECUTABLE.to_string(),
    }
  }
}

impl AuditConfig {
  /// Load the user's configuration file, or defaults when it does not exist.
  pub fn load(config_dirs: &ConfigDirs) -> Result<Self> {
    let config_path = config_dirs.config_path();

    if config_path.exists() {
      Self::load_from(&config_path)
    } else {
      tracing::debug!("No config file at {}, using defaults", config_path.display());
      Ok(Self::default())
    }
  }

  /// Load a specific configuration file, which must exist.
  pub fn load_from(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config: Self =
      toml::from_str(&content).with_context(|| format!("Failed to parse config from {}", path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid config in {}", path.display()))?;
    Ok(config)
  }

  /// Reject settings that would make every command fail.
  pub fn validate(&self) -> Result<()> {
    if self.remote.trim().is_empty() {
      bail!("remote must not be empty");
    }
    if self.command_timeout_secs == 0 {
      bail!("command_timeout_secs must be greater than zero");
    }
    if self.trunk_branch.as_deref().is_some_and(|trunk| trunk.trim().is_empty()) {
      bail!("trunk_branch must not be empty when set");
    }
    Ok(())
  }

  pub fn command_timeout(&self) -> Duration {
    Duration::from_secs(self.command_timeout_secs)
  }

  /// Command port honouring the configured executable and timeout.
  pub fn git(&self) -> GitCli {
    GitCli::new(self.git_executable.clone(), self.command_timeout())
  }

  /// Trunk for a repository: configured name, else the remote's default
  /// branch, else `master`.
  pub fn resolve_trunk(&self, remote_branches: &RemoteBranchSet) -> BranchName {
    if let Some(trunk) = self.trunk_branch.as_deref().and_then(BranchName::normalized) {
      return trunk;
    }
    remote_branches
      .default_branch
      .clone()
      .unwrap_or_else(|| BranchName::from(consts::FALLBACK_TRUNK_BRANCH))
  }
}
