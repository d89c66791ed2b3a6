//! DirectoryRecord: the per-directory document written to record files and
//! sent to the index.

use crate::catalogue::CatalogueMetadata;
use crate::types::{compute_document_id, DocumentId, DocumentIdentity};
use serde::{Deserialize, Serialize};

/// Record kind. Only directories are indexed today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    #[default]
    Dir,
}

/// One directory encountered during a walk or a deposit event.
///
/// Field names on the wire are the ones the browsing UI reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    /// Number of `/` separators in the literal path
    pub depth: usize,

    #[serde(rename = "dir")]
    pub name: String,

    pub path: String,

    #[serde(rename = "archive_path")]
    pub canonical_path: String,

    #[serde(rename = "link", default)]
    pub is_link_root: bool,

    #[serde(rename = "type", default)]
    pub kind: RecordKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,

    #[serde(rename = "readme", default, skip_serializing_if = "Option::is_none")]
    pub readme_text: Option<String>,
}

impl DirectoryRecord {
    /// Record with only the structural fields set
    pub fn new(path: &str, canonical_path: &str, is_link_root: bool) -> Self {
        let trimmed = path.trim_end_matches('/');
        let name = trimmed.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            depth: path_depth(path),
            name,
            path: path.to_string(),
            canonical_path: canonical_path.to_string(),
            is_link_root,
            kind: RecordKind::Dir,
            title: None,
            external_url: None,
            record_type: None,
            readme_text: None,
        }
    }

    /// Splice in catalogue fields
    pub fn apply_metadata(&mut self, metadata: CatalogueMetadata) {
        self.title = Some(metadata.title);
        self.external_url = metadata.external_url;
        self.record_type = metadata.record_type;
    }

    /// True when a non-empty title is attached
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Index document id under the given identity scheme
    pub fn document_id(&self, identity: DocumentIdentity) -> DocumentId {
        match identity {
            DocumentIdentity::Path => compute_document_id(&self.path),
            DocumentIdentity::CanonicalPath => compute_document_id(&self.canonical_path),
        }
    }

    /// Serialize as one NDJSON line (no trailing newline)
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Separator count of a literal path
pub fn path_depth(path: &str) -> usize {
    path.matches('/').count()
}
