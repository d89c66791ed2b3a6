//! CatalogueMapping: archive path -> catalogue record, with snapshot persistence.

use super::record::CatalogueRecord;
use crate::error::StorageError;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Mutable mapping from canonical archive path to catalogue record.
///
/// Keys may carry a trailing `/`; snapshots written by older tooling mix both
/// forms and lookups accept either.
#[derive(Debug, Clone, Default)]
pub struct CatalogueMapping {
    entries: HashMap<String, CatalogueRecord>,
    dirty: bool,
}

impl CatalogueMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot. A missing file is an empty mapping; an unparsable one
    /// is an error.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            info!(snapshot = %path.display(), "No catalogue mapping snapshot, starting empty");
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let entries: HashMap<String, CatalogueRecord> =
            serde_json::from_str(&content).map_err(|e| StorageError::SnapshotCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        info!(
            snapshot = %path.display(),
            entries = entries.len(),
            "Loaded catalogue mapping snapshot"
        );
        Ok(Self {
            entries,
            dirty: false,
        })
    }

    /// Overwrite the snapshot file with the full mapping
    pub fn save(&mut self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string(&self.entries)?;
        std::fs::write(path, content)?;
        self.dirty = false;
        info!(
            snapshot = %path.display(),
            entries = self.entries.len(),
            "Saved catalogue mapping snapshot"
        );
        Ok(())
    }

    pub fn insert(&mut self, path: &str, record: CatalogueRecord) {
        self.entries.insert(path.to_string(), record);
        self.dirty = true;
    }

    /// Exact key lookup, tolerating a trailing separator on the stored key
    pub fn get(&self, path: &str) -> Option<&CatalogueRecord> {
        self.entries
            .get(path)
            .or_else(|| self.entries.get(&format!("{}/", path)))
    }

    /// Nearest registered ancestor (the path itself included).
    ///
    /// Strips one component per step and stops once the path is a single
    /// separator or empty.
    pub fn nearest(&self, path: &str) -> Option<&CatalogueRecord> {
        let mut current = path.trim_end_matches('/');
        while current.len() > 1 {
            if let Some(record) = self.get(current) {
                return Some(record);
            }
            current = parent_of(current);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once an insert happened since the last load or save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl FromIterator<(String, CatalogueRecord)> for CatalogueMapping {
    fn from_iter<I: IntoIterator<Item = (String, CatalogueRecord)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            dirty: false,
        }
    }
}

/// Parent of a `/`-separated path string, `/` for top-level entries and the
/// empty string for relative single components.
fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}
