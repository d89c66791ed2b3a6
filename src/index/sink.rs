//! Index sink contract and bulk action encoding.

use crate::error::ApiError;
use crate::tree::DirectoryRecord;
use crate::types::{DocumentId, DocumentIdentity};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Full document upsert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexDocument {
    pub id: DocumentId,
    pub document: DirectoryRecord,
}

impl IndexDocument {
    pub fn from_record(record: DirectoryRecord, identity: DocumentIdentity) -> Self {
        Self {
            id: record.document_id(identity),
            document: record,
        }
    }
}

/// Partial-field update of an existing document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialUpdate {
    pub id: DocumentId,
    pub fields: Map<String, Value>,
}

impl PartialUpdate {
    /// Readme-only enrichment
    pub fn readme(id: DocumentId, text: String) -> Self {
        let mut fields = Map::new();
        fields.insert("readme".to_string(), Value::String(text));
        Self { id, fields }
    }
}

/// Outcome of one sink call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl SinkReport {
    pub fn all_succeeded(count: usize) -> Self {
        Self {
            submitted: count,
            succeeded: count,
            failed: 0,
        }
    }

    pub fn merge(&mut self, other: SinkReport) {
        self.submitted += other.submitted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

impl std::fmt::Display for SinkReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "submitted={} succeeded={} failed={}",
            self.submitted, self.succeeded, self.failed
        )
    }
}

/// Destination for directory documents.
///
/// An `Err` means the sink itself is unusable; per-document rejections are
/// counted in the report.
pub trait IndexSink {
    fn upsert(&mut self, documents: &[IndexDocument]) -> Result<SinkReport, ApiError>;
    fn delete(&mut self, ids: &[DocumentId]) -> Result<SinkReport, ApiError>;
    fn update(&mut self, updates: &[PartialUpdate]) -> Result<SinkReport, ApiError>;
}

/// One bulk operation, as sent to the search index
#[derive(Debug, Clone, PartialEq)]
pub enum BulkAction<'a> {
    Index(&'a IndexDocument),
    Delete(&'a DocumentId),
    Update(&'a PartialUpdate),
}

impl BulkAction<'_> {
    /// NDJSON lines for this action, each terminated by `\n`
    pub fn encode(&self, index: Option<&str>) -> Result<String, ApiError> {
        let header = |op: &str, id: &str| {
            let mut meta = Map::new();
            if let Some(index) = index {
                meta.insert("_index".to_string(), Value::String(index.to_string()));
            }
            meta.insert("_id".to_string(), Value::String(id.to_string()));
            json!({ op: meta })
        };
        let lines = match self {
            BulkAction::Index(doc) => vec![
                header("index", &doc.id),
                serde_json::to_value(&doc.document).map_err(encode_error)?,
            ],
            BulkAction::Delete(id) => vec![header("delete", id)],
            BulkAction::Update(update) => vec![
                header("update", &update.id),
                json!({ "doc": update.fields }),
            ],
        };
        let mut out = String::new();
        for line in lines {
            out.push_str(&serde_json::to_string(&line).map_err(encode_error)?);
            out.push('\n');
        }
        Ok(out)
    }
}

fn encode_error(e: serde_json::Error) -> ApiError {
    ApiError::SinkError(format!("Failed to encode bulk action: {}", e))
}
