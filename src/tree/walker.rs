//! Directory tree walker.
//!
//! Walks a subtree depth-first and yields one `DirectoryRecord` per
//! directory. Symlinked directories are always emitted; those that resolve to
//! another location inside the archive (link roots) are also descended, with
//! links followed unconditionally below them. Every visited directory has its
//! `00README` captured into a `ReadmeStore`.

use super::builder::RecordBuilder;
use super::readme::{ReadmeDecoding, ReadmeStore};
use super::record::DirectoryRecord;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Walker configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Visit entries in file name order instead of raw enumeration order
    #[serde(default)]
    pub sort_by_name: bool,

    /// Attach captured readme text to the emitted records
    #[serde(default)]
    pub attach_readmes: bool,

    /// Decoding policy for `00README` content
    #[serde(default)]
    pub readme_decoding: ReadmeDecoding,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            sort_by_name: false,
            attach_readmes: false,
            readme_decoding: ReadmeDecoding::Replace,
        }
    }
}

/// Counters for one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub directories: usize,
    pub link_roots: usize,
    pub skipped_entries: usize,
}

/// Entry point: binds a record builder to a walker configuration
pub struct TreeWalker<'a> {
    builder: &'a RecordBuilder<'a>,
    config: WalkerConfig,
}

impl<'a> TreeWalker<'a> {
    pub fn new(builder: &'a RecordBuilder<'a>, config: WalkerConfig) -> Self {
        Self { builder, config }
    }

    /// Start a walk at `root`. Fails only when the root itself cannot be
    /// listed.
    pub fn walk(&self, root: &Path) -> Result<TreeWalk<'a>, ApiError> {
        let inaccessible = |reason: String| ApiError::RootInaccessible {
            path: root.to_path_buf(),
            reason,
        };
        let metadata = std::fs::metadata(root).map_err(|e| inaccessible(e.to_string()))?;
        if !metadata.is_dir() {
            return Err(inaccessible("not a directory".to_string()));
        }
        std::fs::read_dir(root).map_err(|e| inaccessible(e.to_string()))?;

        debug!(root = %root.display(), "Starting tree walk");
        Ok(TreeWalk {
            builder: self.builder,
            config: self.config,
            pending_root: Some(root.to_path_buf()),
            outer: directory_entries(root, false, self.config.sort_by_name),
            inner: None,
            readmes: ReadmeStore::new(),
            stats: WalkStats::default(),
        })
    }
}

/// A single, non-restartable traversal
pub struct TreeWalk<'a> {
    builder: &'a RecordBuilder<'a>,
    config: WalkerConfig,
    pending_root: Option<PathBuf>,
    outer: walkdir::IntoIter,
    /// Active descent below a link root
    inner: Option<walkdir::IntoIter>,
    readmes: ReadmeStore,
    stats: WalkStats,
}

impl<'a> TreeWalk<'a> {
    /// Readmes captured so far
    pub fn readmes(&self) -> &ReadmeStore {
        &self.readmes
    }

    pub fn into_readmes(self) -> ReadmeStore {
        self.readmes
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Record for a directory the walk descends into
    fn visit(&mut self, path: &Path) -> DirectoryRecord {
        let record = self.builder.build(path);
        self.finish(record, true)
    }

    fn finish(&mut self, mut record: DirectoryRecord, visited: bool) -> DirectoryRecord {
        if visited {
            if let Some(text) = self.builder.read_readme(Path::new(&record.path)) {
                if self.config.attach_readmes {
                    record.readme_text = Some(text.clone());
                }
                self.readmes.insert(&record.path, text);
            }
        }
        self.stats.directories += 1;
        record
    }

    fn skip(&mut self, err: walkdir::Error) {
        self.stats.skipped_entries += 1;
        match err.path() {
            Some(path) => warn!("Skipping {}: {}", path.display(), err),
            None => warn!("Skipping entry: {}", err),
        }
    }

    fn next_below_link_root(&mut self) -> Option<DirectoryRecord> {
        loop {
            let next = self.inner.as_mut()?.next();
            match next {
                Some(Ok(entry)) if entry.file_type().is_dir() => {
                    return Some(self.visit(entry.path()));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => self.skip(e),
                None => {
                    self.inner = None;
                    return None;
                }
            }
        }
    }
}

impl Iterator for TreeWalk<'_> {
    type Item = DirectoryRecord;

    fn next(&mut self) -> Option<DirectoryRecord> {
        if let Some(root) = self.pending_root.take() {
            return Some(self.visit(&root));
        }

        if let Some(record) = self.next_below_link_root() {
            return Some(record);
        }

        loop {
            let entry = match self.outer.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    self.skip(e);
                    continue;
                }
            };
            let file_type = entry.file_type();

            if file_type.is_dir() {
                return Some(self.visit(entry.path()));
            }

            // Symlinks show up as directories only when their target is one
            if file_type.is_symlink() && entry.path().is_dir() {
                let record = self.builder.build(entry.path());
                if record.is_link_root {
                    debug!(
                        path = %record.path,
                        target = %record.canonical_path,
                        "Following link root"
                    );
                    self.stats.link_roots += 1;
                    self.inner = Some(directory_entries(
                        entry.path(),
                        true,
                        self.config.sort_by_name,
                    ));
                }
                let visited = record.is_link_root;
                return Some(self.finish(record, visited));
            }
        }
    }
}

fn directory_entries(path: &Path, follow_links: bool, sort_by_name: bool) -> walkdir::IntoIter {
    let mut walker = WalkDir::new(path).follow_links(follow_links).min_depth(1);
    if sort_by_name {
        walker = walker.sort_by(|a, b| a.file_name().cmp(b.file_name()));
    }
    walker.into_iter()
}
