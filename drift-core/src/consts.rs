//! Constants shared across the audit engine.

use std::time::Duration;

/// Platform-specific Git executable name
#[cfg(windows)]
pub const GIT_EXECUTABLE: &str = "git.exe";

/// Platform-specific Git executable name
#[cfg(not(windows))]
pub const GIT_EXECUTABLE: &str = "git";

/// Remote whose branches are audited unless configured otherwise.
pub const DEFAULT_REMOTE: &str = "origin";

/// Trunk used when none is configured and the remote advertises no default.
pub const FALLBACK_TRUNK_BRANCH: &str = "master";

/// Upper bound for a single git invocation.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Name of the per-repository metadata entry used to recognise working copies.
pub const GIT_METADATA_DIR: &str = ".git";

/// Marker git prints between an alias and its target in `git branch -r`.
pub const SYMBOLIC_REF_ARROW: &str = " -> ";
