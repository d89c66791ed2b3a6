//! Search index sinks.
//!
//! The browsing UI reads directory documents from a search index. This
//! module defines the narrow contract the pipeline writes through and the
//! concrete sinks selected by configuration.

pub mod elasticsearch;
pub mod ndjson;
pub mod sink;

pub use elasticsearch::ElasticsearchSink;
pub use ndjson::{MemorySink, NdjsonFileSink};
pub use sink::{BulkAction, IndexDocument, IndexSink, PartialUpdate, SinkReport};

use crate::config::{IndexConfig, SinkKind};
use crate::error::ApiError;
use std::time::Duration;

/// Open the sink named by the index configuration
pub fn open_sink(config: &IndexConfig) -> Result<Box<dyn IndexSink>, ApiError> {
    match config.sink {
        SinkKind::Elasticsearch => {
            let host = config.host.as_deref().ok_or_else(|| {
                ApiError::ConfigError("index.host is required for the elasticsearch sink".into())
            })?;
            let index = config.index.as_deref().ok_or_else(|| {
                ApiError::ConfigError("index.index is required for the elasticsearch sink".into())
            })?;
            Ok(Box::new(ElasticsearchSink::new(
                host,
                index,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
        SinkKind::Ndjson => {
            let path = config.output_file.as_deref().ok_or_else(|| {
                ApiError::ConfigError("index.output_file is required for the ndjson sink".into())
            })?;
            Ok(Box::new(NdjsonFileSink::create(path, config.index.as_deref())?))
        }
    }
}
