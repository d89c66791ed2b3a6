//! Integration tests for the archive directory indexer

mod cli_commands;
mod coverage_flow;
mod deposit_flow;
mod support;
mod symlink_walk;
mod walk_idempotence;
