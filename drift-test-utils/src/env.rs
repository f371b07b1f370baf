//! Environment variable management for testing
//!
//! Points `XDG_CONFIG_HOME` at a per-test temporary directory so tests never
//! read or write the user's real drift configuration.

use std::env;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Overrides `XDG_CONFIG_HOME` for the lifetime of the guard.
pub struct EnvTestGuard {
  /// The temporary directory used as the XDG config home
  pub temp_dir: TempDir,
  /// The original XDG_CONFIG_HOME value, if any
  original_config_home: Option<String>,
}

impl Default for EnvTestGuard {
  fn default() -> Self {
    Self::new()
  }
}

impl EnvTestGuard {
  pub const XDG_CONFIG_HOME: &'static str = "XDG_CONFIG_HOME";

  /// Create a new test environment with an overridden config home
  pub fn new() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let original_config_home = env::var(Self::XDG_CONFIG_HOME).ok();

    let config_home = temp_dir.path().join("config");
    fs::create_dir_all(&config_home).expect("Failed to create config directory");
    unsafe {
      env::set_var(Self::XDG_CONFIG_HOME, &config_home);
    }

    Self {
      temp_dir,
      original_config_home,
    }
  }

  /// The directory exported as `XDG_CONFIG_HOME`
  pub fn config_home(&self) -> PathBuf {
    self.temp_dir.path().join("config")
  }

  /// Path of drift's config file inside the overridden config home
  pub fn drift_config_path(&self) -> PathBuf {
    self.config_home().join("drift").join("config.toml")
  }

  /// Write drift's config file, creating its directory
  pub fn write_drift_config(&self, contents: &str) -> PathBuf {
    let path = self.drift_config_path();
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).expect("Failed to create drift config directory");
    }
    fs::write(&path, contents).expect("Failed to write drift config");
    path
  }
}

impl Drop for EnvTestGuard {
  fn drop(&mut self) {
    match &self.original_config_home {
      Some(val) => unsafe {
        env::set_var(EnvTestGuard::XDG_CONFIG_HOME, val);
      },
      None => unsafe {
        env::remove_var(EnvTestGuard::XDG_CONFIG_HOME);
      },
    }
  }
}
