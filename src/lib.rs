//! archive-dirs: directory index builder for an archive browser.
//!
//! Walks archive directory trees into per-directory records, attaches
//! catalogue metadata resolved through the nearest registered ancestor (with
//! a live service fallback) and maintains a search index from walk output and
//! deposit events.

pub mod catalogue;
pub mod config;
pub mod coverage;
pub mod dedup;
pub mod deposit;
pub mod error;
pub mod index;
pub mod logging;
pub mod spot;
pub mod summary;
pub mod tooling;
pub mod tree;
pub mod types;
