//! Catalogue resolution: nearest registered ancestor with live fallback.

use super::client::CatalogueService;
use super::mapping::CatalogueMapping;
use super::record::CatalogueMetadata;
use crate::error::ApiError;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Counters for one resolver lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub live_lookups: usize,
    pub live_hits: usize,
    pub live_failures: usize,
}

/// The single catalogue resolver shared by the tree builder, the coverage
/// pass and the deposit path.
///
/// Owns the mapping for the whole run. Misses are never cached: a path
/// without a record is queried again on every call.
pub struct CatalogueResolver {
    mapping: RwLock<CatalogueMapping>,
    service: Option<Box<dyn CatalogueService>>,
    snapshot_path: Option<PathBuf>,
    live_lookups: AtomicUsize,
    live_hits: AtomicUsize,
    live_failures: AtomicUsize,
}

impl CatalogueResolver {
    /// Create a resolver over an in-memory mapping
    pub fn new(mapping: CatalogueMapping, service: Option<Box<dyn CatalogueService>>) -> Self {
        Self {
            mapping: RwLock::new(mapping),
            service,
            snapshot_path: None,
            live_lookups: AtomicUsize::new(0),
            live_hits: AtomicUsize::new(0),
            live_failures: AtomicUsize::new(0),
        }
    }

    /// Load the mapping snapshot and remember where to persist it
    pub fn load(
        snapshot_path: &Path,
        service: Option<Box<dyn CatalogueService>>,
    ) -> Result<Self, ApiError> {
        let mapping = CatalogueMapping::load(snapshot_path)?;
        let mut resolver = Self::new(mapping, service);
        resolver.snapshot_path = Some(snapshot_path.to_path_buf());
        Ok(resolver)
    }

    pub fn has_live_service(&self) -> bool {
        self.service.is_some()
    }

    /// Resolve catalogue metadata for a canonical archive path.
    ///
    /// A registered ancestor at any height wins, even when its entry has no
    /// usable title. Only when no ancestor is registered is the live service
    /// asked about the full path.
    pub fn resolve(&self, canonical_path: &str) -> Option<CatalogueMetadata> {
        let local = {
            let mapping = self.mapping.read();
            mapping.nearest(canonical_path).map(|record| record.metadata())
        };
        match local {
            Some(metadata) => metadata,
            None => self.lookup_live(canonical_path),
        }
    }

    /// Mapping-only resolution, no service call
    pub fn resolve_local(&self, canonical_path: &str) -> Option<CatalogueMetadata> {
        self.mapping
            .read()
            .nearest(canonical_path)
            .and_then(|record| record.metadata())
    }

    /// True when the path itself is registered, ignoring ancestors
    pub fn is_registered(&self, canonical_path: &str) -> bool {
        self.mapping.read().get(canonical_path).is_some()
    }

    /// Ask the live service about exactly this path; hits are cached under it.
    pub fn lookup_live(&self, canonical_path: &str) -> Option<CatalogueMetadata> {
        let service = self.service.as_ref()?;
        self.live_lookups.fetch_add(1, Ordering::Relaxed);

        match service.lookup(canonical_path) {
            Ok(Some(record)) => {
                let metadata = record.metadata()?;
                self.live_hits.fetch_add(1, Ordering::Relaxed);
                debug!(path = canonical_path, title = %metadata.title, "Catalogue record found");
                self.mapping.write().insert(canonical_path, record);
                Some(metadata)
            }
            Ok(None) => None,
            Err(e) => {
                self.live_failures.fetch_add(1, Ordering::Relaxed);
                warn!(path = canonical_path, "Catalogue lookup failed: {}", e);
                None
            }
        }
    }

    /// Write the snapshot back if live lookups grew the mapping.
    ///
    /// Returns whether a write happened.
    pub fn persist(&self) -> Result<bool, ApiError> {
        let Some(path) = self.snapshot_path.as_deref() else {
            return Ok(false);
        };
        let mut mapping = self.mapping.write();
        if !mapping.is_dirty() {
            return Ok(false);
        }
        mapping.save(path)?;
        Ok(true)
    }

    /// Write the full mapping to an explicit location
    pub fn save_to(&self, path: &Path) -> Result<(), ApiError> {
        self.mapping.write().save(path)?;
        Ok(())
    }

    pub fn mapping_len(&self) -> usize {
        self.mapping.read().len()
    }

    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            live_lookups: self.live_lookups.load(Ordering::Relaxed),
            live_hits: self.live_hits.load(Ordering::Relaxed),
            live_failures: self.live_failures.load(Ordering::Relaxed),
        }
    }
}
