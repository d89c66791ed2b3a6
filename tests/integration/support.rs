use archive_dirs::catalogue::{CatalogueRecord, CatalogueService};
use archive_dirs::error::ApiError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Catalogue service answering from a fixed table and recording every call
#[derive(Default, Clone)]
pub struct FixedCatalogue {
    titles: HashMap<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FixedCatalogue {
    pub fn with_title(mut self, path: &str, title: &str) -> Self {
        self.titles.insert(path.to_string(), title.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl CatalogueService for FixedCatalogue {
    fn lookup(&self, archive_path: &str) -> Result<Option<CatalogueRecord>, ApiError> {
        self.calls.lock().push(archive_path.to_string());
        Ok(self
            .titles
            .get(archive_path)
            .map(|title| CatalogueRecord::titled(title)))
    }
}

/// Temporary archive root, canonicalized so literal and resolved paths agree
pub fn archive_root() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = dunce::canonicalize(temp.path()).unwrap();
    (temp, root)
}

pub fn lossy(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
