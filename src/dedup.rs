//! Deduplication of record files produced by separate walks.
//!
//! Walks of overlapping spots emit the same directory more than once. The
//! record files are read in parallel, merged into one set of unique lines and
//! split into records ready for indexing and records still missing metadata.

use crate::error::ApiError;
use crate::tree::DirectoryRecord;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    pub files: usize,
    pub unreadable_files: usize,
    pub unique_lines: usize,
    pub complete: usize,
    pub missing: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct DedupOutcome {
    /// Records with a title, plus every depth-1 record
    pub complete: Vec<DirectoryRecord>,
    /// Records still lacking metadata
    pub missing: Vec<DirectoryRecord>,
    pub stats: DedupStats,
}

/// Files in `dir` with the given extension, sorted by name
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ApiError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read `files` with at most `workers` concurrent readers and merge their
/// non-empty lines. Unreadable files are logged and counted.
pub fn collect_unique_lines(
    files: Vec<PathBuf>,
    workers: usize,
) -> Result<(BTreeSet<String>, usize), ApiError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let mut handles = Vec::with_capacity(files.len());
        for path in files {
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = tokio::fs::read_to_string(&path).await;
                (path, result)
            }));
        }

        let mut lines = BTreeSet::new();
        let mut unreadable = 0;
        for handle in handles {
            let (path, result) = handle
                .await
                .map_err(|e| ApiError::InvalidInput(format!("Reader task failed: {}", e)))?;
            match result {
                Ok(content) => {
                    let before = lines.len();
                    lines.extend(
                        content
                            .lines()
                            .map(str::trim)
                            .filter(|line| !line.is_empty())
                            .map(str::to_string),
                    );
                    debug!(file = %path.display(), new_lines = lines.len() - before, "Read record file");
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping unreadable record file");
                    unreadable += 1;
                }
            }
        }
        Ok((lines, unreadable))
    })
}

/// Parse unique lines and split them into complete and missing records
pub fn partition(lines: &BTreeSet<String>) -> DedupOutcome {
    let mut outcome = DedupOutcome::default();
    outcome.stats.unique_lines = lines.len();
    for line in lines {
        match DirectoryRecord::from_line(line) {
            Ok(record) if record.has_title() || record.depth == 1 => {
                outcome.complete.push(record)
            }
            Ok(record) => outcome.missing.push(record),
            Err(e) => {
                warn!(error = %e, "Skipping unparsable record line");
                outcome.stats.skipped += 1;
            }
        }
    }
    outcome.stats.complete = outcome.complete.len();
    outcome.stats.missing = outcome.missing.len();
    outcome
}

/// List, read and partition every `*.txt` record file in `dir`
pub fn deduplicate_directory(dir: &Path, workers: usize) -> Result<DedupOutcome, ApiError> {
    let files = list_files(dir, "txt")?;
    let file_count = files.len();
    let (lines, unreadable) = collect_unique_lines(files, workers)?;
    let mut outcome = partition(&lines);
    outcome.stats.files = file_count;
    outcome.stats.unreadable_files = unreadable;
    info!(
        files = file_count,
        unique = outcome.stats.unique_lines,
        complete = outcome.stats.complete,
        missing = outcome.stats.missing,
        skipped = outcome.stats.skipped,
        "Deduplicated record files"
    );
    Ok(outcome)
}
