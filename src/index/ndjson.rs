//! Offline sinks: bulk actions appended to a file, or kept in memory.

use super::sink::{BulkAction, IndexDocument, IndexSink, PartialUpdate, SinkReport};
use crate::error::ApiError;
use crate::types::DocumentId;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends bulk action lines to a file, ready for a later `_bulk` replay
pub struct NdjsonFileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    index: Option<String>,
}

impl NdjsonFileSink {
    pub fn create(path: &Path, index: Option<&str>) -> Result<Self, ApiError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            index: index.map(str::to_string),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&mut self, actions: &[BulkAction<'_>]) -> Result<SinkReport, ApiError> {
        for action in actions {
            let encoded = action.encode(self.index.as_deref())?;
            self.writer.write_all(encoded.as_bytes())?;
        }
        self.writer.flush()?;
        Ok(SinkReport::all_succeeded(actions.len()))
    }
}

impl IndexSink for NdjsonFileSink {
    fn upsert(&mut self, documents: &[IndexDocument]) -> Result<SinkReport, ApiError> {
        let actions: Vec<_> = documents.iter().map(BulkAction::Index).collect();
        self.write(&actions)
    }

    fn delete(&mut self, ids: &[DocumentId]) -> Result<SinkReport, ApiError> {
        let actions: Vec<_> = ids.iter().map(BulkAction::Delete).collect();
        self.write(&actions)
    }

    fn update(&mut self, updates: &[PartialUpdate]) -> Result<SinkReport, ApiError> {
        let actions: Vec<_> = updates.iter().map(BulkAction::Update).collect();
        self.write(&actions)
    }
}

/// Keeps every operation in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub upserts: Vec<IndexDocument>,
    pub deletions: Vec<DocumentId>,
    pub updates: Vec<PartialUpdate>,
}

impl IndexSink for MemorySink {
    fn upsert(&mut self, documents: &[IndexDocument]) -> Result<SinkReport, ApiError> {
        self.upserts.extend_from_slice(documents);
        Ok(SinkReport::all_succeeded(documents.len()))
    }

    fn delete(&mut self, ids: &[DocumentId]) -> Result<SinkReport, ApiError> {
        self.deletions.extend_from_slice(ids);
        Ok(SinkReport::all_succeeded(ids.len()))
    }

    fn update(&mut self, updates: &[PartialUpdate]) -> Result<SinkReport, ApiError> {
        self.updates.extend_from_slice(updates);
        Ok(SinkReport::all_succeeded(updates.len()))
    }
}
