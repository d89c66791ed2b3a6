//! Coverage Improvement
//!
//! Second pass over records that came out of the first build without a
//! catalogue title. Works top-down one depth level at a time: records at the
//! current depth whose own path is not registered are looked up live, hits
//! are folded into the mapping, and then the whole remaining pool is matched
//! again so deeper records can inherit what was just found.

use crate::catalogue::CatalogueResolver;
use crate::tree::DirectoryRecord;
use tracing::{debug, info};

/// Depth levels visited before giving up on the remaining pool
pub const DEFAULT_DEPTH_LEVELS: usize = 4;

/// Counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageStats {
    pub input: usize,
    pub top_level: usize,
    pub iterations: usize,
    pub live_lookups: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

/// Result of a pass. The grown mapping stays with the resolver.
#[derive(Debug, Clone, Default)]
pub struct CoverageOutcome {
    /// Records that gained a title
    pub resolved: Vec<DirectoryRecord>,
    /// Top-level records plus everything still without a title
    pub unresolved: Vec<DirectoryRecord>,
    pub stats: CoverageStats,
}

pub struct CoveragePass<'a> {
    catalogue: &'a CatalogueResolver,
    depth_levels: usize,
}

impl<'a> CoveragePass<'a> {
    pub fn new(catalogue: &'a CatalogueResolver) -> Self {
        Self {
            catalogue,
            depth_levels: DEFAULT_DEPTH_LEVELS,
        }
    }

    pub fn with_depth_levels(mut self, depth_levels: usize) -> Self {
        self.depth_levels = depth_levels;
        self
    }

    pub fn run(&self, records: Vec<DirectoryRecord>) -> CoverageOutcome {
        let mut outcome = CoverageOutcome {
            stats: CoverageStats {
                input: records.len(),
                ..CoverageStats::default()
            },
            ..CoverageOutcome::default()
        };
        let lookups_before = self.catalogue.stats().live_lookups;
        let mut pool = records;

        for depth in 1..=self.depth_levels {
            if pool.is_empty() {
                break;
            }
            outcome.stats.iterations += 1;

            if depth == 1 {
                // Archive top level never carries catalogue metadata
                let (top, rest): (Vec<_>, Vec<_>) = pool.into_iter().partition(|r| r.depth == 1);
                outcome.stats.top_level = top.len();
                outcome.unresolved.extend(top);
                pool = rest;
                continue;
            }

            for record in pool.iter().filter(|r| r.depth == depth) {
                if !self.catalogue.is_registered(&record.canonical_path) {
                    self.catalogue.lookup_live(&record.canonical_path);
                }
            }

            let before = outcome.resolved.len();
            let mut remaining = Vec::with_capacity(pool.len());
            for mut record in pool {
                match self.catalogue.resolve_local(&record.canonical_path) {
                    Some(metadata) => {
                        record.apply_metadata(metadata);
                        outcome.resolved.push(record);
                    }
                    None => remaining.push(record),
                }
            }
            pool = remaining;
            debug!(
                depth,
                newly_resolved = outcome.resolved.len() - before,
                remaining = pool.len(),
                "Coverage depth complete"
            );
        }

        outcome.unresolved.extend(pool);
        outcome.stats.live_lookups = self.catalogue.stats().live_lookups - lookups_before;
        outcome.stats.resolved = outcome.resolved.len();
        outcome.stats.unresolved = outcome.unresolved.len();
        info!(
            resolved = outcome.stats.resolved,
            unresolved = outcome.stats.unresolved,
            live_lookups = outcome.stats.live_lookups,
            "Coverage pass finished"
        );
        outcome
    }
}
