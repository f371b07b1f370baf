//! Build script for the drift CLI
//!
//! Embeds version metadata shown by `drift --version`

use std::env;
use std::process::Command;

/// Entry point for the build script.
fn main() {
  embed_build_info();
  set_rerun_conditions();
}

/// Embeds the commit hash and target triple as compile-time environment
/// variables. Both are always set, empty when unavailable, so `env!` can rely
/// on them.
fn embed_build_info() {
  let git_hash = Command::new("git")
    .args(["rev-parse", "--short", "HEAD"])
    .output()
    .ok()
    .filter(|output| output.status.success())
    .and_then(|output| String::from_utf8(output.stdout).ok())
    .map(|hash| hash.trim().to_string())
    .unwrap_or_else(|| "unknown".to_string());
  println!("cargo:rustc-env=GIT_HASH={git_hash}");

  println!("cargo:rustc-env=TARGET={}", env::var("TARGET").unwrap_or_default());
}

/// Configures conditions that trigger build script re-execution.
fn set_rerun_conditions() {
  println!("cargo:rerun-if-changed=build.rs");

  // The workspace root holds .git; rerun when HEAD moves
  println!("cargo:rerun-if-changed=../.git/HEAD");

  println!("cargo:rerun-if-env-changed=TARGET");
}
