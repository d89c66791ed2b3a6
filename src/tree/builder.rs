//! Metadata record builder: one `DirectoryRecord` per path.

use super::readme::ReadmeReader;
use super::record::DirectoryRecord;
use crate::catalogue::CatalogueResolver;
use crate::spot::{path_text, SpotResolver};
use std::path::Path;

/// Assembles directory records from the spot mapping and the catalogue
pub struct RecordBuilder<'a> {
    spots: &'a dyn SpotResolver,
    catalogue: &'a CatalogueResolver,
    readmes: ReadmeReader,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(
        spots: &'a dyn SpotResolver,
        catalogue: &'a CatalogueResolver,
        readmes: ReadmeReader,
    ) -> Self {
        Self {
            spots,
            catalogue,
            readmes,
        }
    }

    /// Build the record for `path`. Catalogue misses leave the metadata
    /// fields empty.
    pub fn build(&self, path: &Path) -> DirectoryRecord {
        let literal = path_text(path);
        let canonical = self.spots.archive_path(path);
        let is_link_root = path.is_symlink() && literal != canonical;

        let mut record = DirectoryRecord::new(&literal, &canonical, is_link_root);
        if let Some(metadata) = self.catalogue.resolve(&canonical) {
            record.apply_metadata(metadata);
        }
        record
    }

    /// Build the record with its readme attached
    pub fn build_with_readme(&self, path: &Path) -> DirectoryRecord {
        let mut record = self.build(path);
        record.readme_text = self.readmes.read(path);
        record
    }

    /// Like `build_with_readme`, but `None` when the path is not a directory
    pub fn build_if_dir(&self, path: &Path) -> Option<DirectoryRecord> {
        if !path.is_dir() {
            return None;
        }
        Some(self.build_with_readme(path))
    }

    /// Decoded `00README` of a directory
    pub fn read_readme(&self, dir: &Path) -> Option<String> {
        self.readmes.read(dir)
    }

    /// Canonical archive path, as used for catalogue lookups
    pub fn archive_path(&self, path: &Path) -> String {
        self.spots.archive_path(path)
    }
}
