//! Identifiers for repositories and branches.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Short branch identifier such as `main` or `feature/x`.
///
/// Wraps an `Arc<str>` so reports can hand the same name to several places
/// without copying. Values are expected to be normalised already; use
/// [`BranchName::normalized`] when starting from raw command output.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BranchName(Arc<str>);

impl BranchName {
  /// Construct a branch name from any string-like value.
  pub fn new(name: impl Into<Arc<str>>) -> Self {
    Self(name.into())
  }

  /// Build a name from a raw token, trimming whitespace. Returns `None` when
  /// nothing is left.
  pub fn normalized(raw: &str) -> Option<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      None
    } else {
      Some(Self::from(trimmed))
    }
  }

  /// Borrow the underlying branch name as a `&str`.
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Remote-qualified form, e.g. `origin/feature/x`.
  pub fn on_remote(&self, remote: &str) -> String {
    format!("{remote}/{}", self.0)
  }
}

impl fmt::Debug for BranchName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("BranchName").field(&self.as_str()).finish()
  }
}

impl fmt::Display for BranchName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<&str> for BranchName {
  fn from(value: &str) -> Self {
    Self::new(Arc::<str>::from(value))
  }
}

impl From<String> for BranchName {
  fn from(value: String) -> Self {
    Self::new(Arc::<str>::from(value))
  }
}

impl PartialEq<str> for BranchName {
  fn eq(&self, other: &str) -> bool {
    self.as_str() == other
  }
}

impl PartialEq<&str> for BranchName {
  fn eq(&self, other: &&str) -> bool {
    self.as_str() == *other
  }
}

impl Serialize for BranchName {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_str())
  }
}

/// Location of one working copy on disk.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct RepositoryPath(PathBuf);

impl RepositoryPath {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self(path.into())
  }

  pub fn as_path(&self) -> &Path {
    &self.0
  }

  /// Final path component, falling back to the full path for roots.
  pub fn name(&self) -> String {
    self
      .0
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| self.0.display().to_string())
  }
}

impl AsRef<Path> for RepositoryPath {
  fn as_ref(&self) -> &Path {
    &self.0
  }
}

impl fmt::Display for RepositoryPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.display())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalized_trims_and_rejects_blank() {
    assert_eq!(BranchName::normalized("  feature/x \n"), Some(BranchName::from("feature/x")));
    assert_eq!(BranchName::normalized("   "), None);
  }

  #[test]
  fn on_remote_prefixes_namespace() {
    assert_eq!(BranchName::from("feature/x").on_remote("origin"), "origin/feature/x");
  }

  #[test]
  fn repository_name_is_last_component() {
    let path = RepositoryPath::new("/work/clones/api");
    assert_eq!(path.name(), "api");
  }
}
