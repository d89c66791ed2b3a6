//! Elasticsearch bulk sink.

use super::sink::{BulkAction, IndexDocument, IndexSink, PartialUpdate, SinkReport};
use crate::error::ApiError;
use crate::types::DocumentId;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Actions per `_bulk` request
const BULK_CHUNK_SIZE: usize = 500;

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    #[serde(default)]
    status: u16,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Sends bulk actions to `{host}/_bulk` with a blocking client
pub struct ElasticsearchSink {
    client: reqwest::blocking::Client,
    host: String,
    index: String,
}

impl ElasticsearchSink {
    pub fn new(host: &str, index: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::SinkError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            index: index.to_string(),
        })
    }

    fn send(&self, actions: &[BulkAction<'_>]) -> Result<SinkReport, ApiError> {
        let mut report = SinkReport::default();
        for chunk in actions.chunks(BULK_CHUNK_SIZE) {
            let mut body = String::new();
            for action in chunk {
                body.push_str(&action.encode(Some(&self.index))?);
            }

            let url = format!("{}/_bulk", self.host);
            let response = self
                .client
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
                .body(body)
                .send()?;
            let status = response.status();
            if !status.is_success() {
                let text = response.text().unwrap_or_default();
                return Err(ApiError::SinkError(format!(
                    "Bulk request to {} failed with {}: {}",
                    url, status, text
                )));
            }
            let parsed: BulkResponse = response.json()?;
            report.merge(summarize(chunk.len(), &parsed));
        }
        debug!(index = %self.index, %report, "Bulk request complete");
        Ok(report)
    }
}

fn summarize(submitted: usize, response: &BulkResponse) -> SinkReport {
    if !response.errors {
        return SinkReport::all_succeeded(submitted);
    }
    let failed = response
        .items
        .iter()
        .flat_map(|item| item.values())
        .filter(|item| item.status >= 300 || item.error.is_some())
        .inspect(|item| {
            if let Some(error) = &item.error {
                warn!(status = item.status, "Bulk item rejected: {}", error);
            }
        })
        .count();
    SinkReport {
        submitted,
        succeeded: submitted.saturating_sub(failed),
        failed,
    }
}

impl IndexSink for ElasticsearchSink {
    fn upsert(&mut self, documents: &[IndexDocument]) -> Result<SinkReport, ApiError> {
        let actions: Vec<BulkAction<'_>> = documents.iter().map(BulkAction::Index).collect();
        self.send(&actions)
    }

    fn delete(&mut self, ids: &[DocumentId]) -> Result<SinkReport, ApiError> {
        let actions: Vec<BulkAction<'_>> = ids.iter().map(BulkAction::Delete).collect();
        self.send(&actions)
    }

    fn update(&mut self, updates: &[PartialUpdate]) -> Result<SinkReport, ApiError> {
        let actions: Vec<BulkAction<'_>> = updates.iter().map(BulkAction::Update).collect();
        self.send(&actions)
    }
}
