//! # Drift Core Library
//!
//! Branch-identity resolution and divergence computation for a tree of git
//! checkouts. For every repository the engine fetches, lists the remote's
//! branches, makes sure each one is tracked locally, works out which branch
//! the checkout is on and counts how far every branch has drifted from its
//! remote counterpart and from the trunk.
//!
//! All git access goes through [`VcsCommandPort`]; all narration goes through
//! [`AuditObserver`]. Results come back as plain [`RepositoryReport`] values.

pub mod audit;
pub mod branch;
pub mod config;
pub mod consts;
pub mod discovery;
pub mod divergence;
pub mod error;
pub mod events;
pub mod fleet;
pub mod remote;
pub mod report;
pub mod resolver;
pub mod tracking;
pub mod vcs;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for consumers
pub use audit::RepositoryAuditor;
pub use branch::{BranchName, RepositoryPath};
pub use config::{AuditConfig, ConfigDirs};
pub use discovery::discover_repositories;
pub use divergence::{DivergenceReport, RemoteStatus, Severity, TrunkStatus};
pub use error::{AmbiguousBranchError, AuditError, VcsCommandError};
pub use events::{AuditEvent, AuditObserver, SilentObserver};
pub use fleet::{CancellationFlag, FleetRunner, run_audit};
pub use remote::RemoteBranchSet;
pub use report::{BranchReport, RepositoryReport};
pub use resolver::{CurrentBranch, ResolutionStrategy};
pub use tracking::TrackingOutcome;
pub use vcs::{GitCli, GitCommand, VcsCommandPort};
