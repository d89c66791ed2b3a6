//! Tooling & Integration Layer
//!
//! Command-line entry points over the walk, dedup, coverage and deposit
//! pipelines.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
