//! Repository discovery.
//!
//! Walks a directory tree and collects every working copy beneath it,
//! recognised by a `.git` entry (a directory for ordinary clones, a file for
//! linked worktrees and submodules).

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::branch::RepositoryPath;
use crate::consts::GIT_METADATA_DIR;

/// Find all repositories under `root`, sorted by path.
///
/// `max_depth` limits how many directories below `root` a repository may
/// sit; `Some(0)` only considers `root` itself. Unreadable directories are
/// logged and skipped.
pub fn discover_repositories(root: &Path, max_depth: Option<usize>) -> Result<Vec<RepositoryPath>> {
  let root = root
    .canonicalize()
    .with_context(|| format!("Failed to resolve search root {}", root.display()))?;

  let mut walker = WalkDir::new(&root).follow_links(false).sort_by_file_name();
  if let Some(depth) = max_depth {
    // The metadata entry sits one level below its repository.
    walker = walker.max_depth(depth + 1);
  }

  let mut repositories = Vec::new();
  let mut entries = walker.into_iter();
  while let Some(entry) = entries.next() {
    let entry = match entry {
      Ok(entry) => entry,
      Err(err) => {
        warn!("Skipping unreadable path during discovery: {}", err);
        continue;
      }
    };

    if entry.file_name() != GIT_METADATA_DIR {
      continue;
    }
    if entry.file_type().is_dir() {
      entries.skip_current_dir();
    }
    if let Some(repo) = entry.path().parent() {
      debug!("Discovered repository at {}", repo.display());
      repositories.push(RepositoryPath::new(repo));
    }
  }

  repositories.sort();
  repositories.dedup();
  Ok(repositories)
}
