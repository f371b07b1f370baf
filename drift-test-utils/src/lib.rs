//! Test utilities shared across the drift workspace
//!
//! This crate provides common testing infrastructure including:
//! - Temporary git repositories ([`GitRepoTestGuard`])
//! - Working clones backed by a local bare "origin" ([`RemoteFixture`])
//! - XDG config directory isolation ([`EnvTestGuard`])
//!
//! The dead_code lint is disabled for this crate because test utilities may
//! not be used by all tests, and the compiler cannot detect usage across
//! crate boundaries in development dependencies.

#![allow(dead_code)]

pub mod env;
pub mod git;
pub mod remote;

// Re-export commonly used items
pub use env::EnvTestGuard;
pub use git::{GitRepoTestGuard, create_commit, run_git};
pub use remote::{ClonedRepo, RemoteFixture};
