//! Incremental index maintenance from deposit events.
//!
//! The deposit-log parser hands over the directories created, removed and
//! symlinked since the last run, plus the `00README` files that changed. Each
//! group becomes one sink call and one report line.

use crate::error::ApiError;
use crate::index::{IndexDocument, IndexSink, PartialUpdate, SinkReport};
use crate::spot::path_text;
use crate::tree::RecordBuilder;
use crate::types::{compute_document_id, DocumentId, DocumentIdentity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Paths extracted from a deposit log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositEvents {
    pub mkdir: Vec<PathBuf>,
    pub rmdir: Vec<PathBuf>,
    pub symlink: Vec<PathBuf>,
    /// Paths of changed `00README` files
    pub readme: Vec<PathBuf>,
}

impl DepositEvents {
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ApiError::InvalidInput(format!(
                "Invalid deposit events file {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.mkdir.is_empty()
            && self.rmdir.is_empty()
            && self.symlink.is_empty()
            && self.readme.is_empty()
    }
}

/// One line per operation group, plus the merged sink outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositReport {
    pub lines: Vec<String>,
    pub totals: SinkReport,
}

impl DepositReport {
    fn push(&mut self, label: &str, events: usize, report: SinkReport) {
        self.lines
            .push(format!("{}: {} Operation status: {}", label, events, report));
        self.totals.merge(report);
    }

    /// Write the report lines to `path`, one per line
    pub fn write_to(&self, path: &Path) -> Result<(), ApiError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut content = self.lines.join("\n");
        content.push('\n');
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl std::fmt::Display for DepositReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// Applies deposit events to an index sink
pub struct DepositProcessor<'a> {
    builder: &'a RecordBuilder<'a>,
    identity: DocumentIdentity,
}

impl<'a> DepositProcessor<'a> {
    pub fn new(builder: &'a RecordBuilder<'a>, identity: DocumentIdentity) -> Self {
        Self { builder, identity }
    }

    /// Apply every event group, then refresh the given spot roots
    pub fn apply(
        &self,
        events: &DepositEvents,
        spot_roots: &[PathBuf],
        sink: &mut dyn IndexSink,
    ) -> Result<DepositReport, ApiError> {
        let mut report = DepositReport::default();

        let created = self.documents(&events.mkdir);
        report.push("New dirs", events.mkdir.len(), sink.upsert(&created)?);

        let deleted: Vec<DocumentId> = events.rmdir.iter().map(|p| self.id_for(p)).collect();
        report.push("Deleted dirs", events.rmdir.len(), sink.delete(&deleted)?);

        let linked = self.documents(&events.symlink);
        report.push("Symlinked dirs", events.symlink.len(), sink.upsert(&linked)?);

        let readmes = self.readme_updates(&events.readme);
        report.push("Added 00READMEs", events.readme.len(), sink.update(&readmes)?);

        if !spot_roots.is_empty() {
            let roots = self.documents(spot_roots);
            report.push("Spot dirs", spot_roots.len(), sink.upsert(&roots)?);
        }

        info!(
            submitted = report.totals.submitted,
            failed = report.totals.failed,
            "Applied deposit events"
        );
        Ok(report)
    }

    /// Documents for the paths that are still directories
    fn documents(&self, paths: &[PathBuf]) -> Vec<IndexDocument> {
        paths
            .iter()
            .filter_map(|path| {
                let record = self.builder.build_if_dir(path);
                if record.is_none() {
                    debug!(path = %path.display(), "Not a directory, skipping");
                }
                record
            })
            .map(|record| IndexDocument::from_record(record, self.identity))
            .collect()
    }

    fn readme_updates(&self, readme_files: &[PathBuf]) -> Vec<PartialUpdate> {
        readme_files
            .iter()
            .filter_map(|file| {
                let dir = file.parent()?;
                let text = self.builder.read_readme(dir)?;
                Some(PartialUpdate::readme(self.id_for(dir), text))
            })
            .collect()
    }

    fn id_for(&self, path: &Path) -> DocumentId {
        document_id_for(self.builder, self.identity, path)
    }
}

/// Id of the document for `path` when no record is at hand
pub fn document_id_for(
    builder: &RecordBuilder<'_>,
    identity: DocumentIdentity,
    path: &Path,
) -> DocumentId {
    match identity {
        DocumentIdentity::Path => compute_document_id(&path_text(path)),
        DocumentIdentity::CanonicalPath => compute_document_id(&builder.archive_path(path)),
    }
}
