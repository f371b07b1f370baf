//! # Drift CLI Library
//!
//! Argument parsing, configuration overrides and rendering for the `drift`
//! binary. The audit itself lives in `drift-core`.

pub mod cli;
pub mod output;
pub mod render;
