//! Core types shared across the directory indexing pipeline.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// DocumentId: lowercase hex SHA-1 of the identity path of a directory
pub type DocumentId = String;

/// Which path of a directory identifies its document in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentIdentity {
    /// Literal walked path. Symlinked routes get their own documents.
    #[default]
    Path,
    /// Canonical archive path. Symlinked routes collapse onto the target.
    CanonicalPath,
}

/// Compute the document id for a path string
pub fn compute_document_id(path: &str) -> DocumentId {
    let mut hasher = Sha1::new();
    hasher.update(path.as_bytes());
    hex::encode(hasher.finalize())
}
