//! Configuration
//!
//! Layered configuration: built-in defaults, an optional TOML file, then
//! `ARCHIVE_DIRS_*` environment variables (`__` separates nested keys, e.g.
//! `ARCHIVE_DIRS_CATALOGUE__LIVE_LOOKUPS=false`).

mod facade;
pub mod merge;
pub mod sources;

pub use facade::ConfigLoader;

use crate::catalogue::DEFAULT_API_URL;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::tree::WalkerConfig;
use crate::types::DocumentIdentity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub archive: ArchiveConfig,
    pub catalogue: CatalogueConfig,
    pub index: IndexConfig,
    pub files: FilesConfig,
    pub walker: WalkerConfig,
    pub logging: LoggingConfig,
}

/// Archive layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Symlink targets outside these roots are not followed; empty accepts all
    pub roots: Vec<PathBuf>,

    /// Spot file (`<spot_name> <path>` per line)
    pub spot_file: Option<PathBuf>,
}

/// Catalogue resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueConfig {
    /// Lookup endpoint; the archive path is appended to it
    pub api_url: String,

    /// Mapping snapshot loaded at startup and written back when it grows
    pub mapping_snapshot: Option<PathBuf>,

    /// Query the service when no registered ancestor matches
    pub live_lookups: bool,

    pub timeout_secs: u64,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            mapping_snapshot: None,
            live_lookups: true,
            timeout_secs: 10,
        }
    }
}

/// Sink implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Elasticsearch,
    Ndjson,
}

/// Search index sink
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub sink: SinkKind,
    pub host: Option<String>,
    pub index: Option<String>,
    /// Bulk action file for the ndjson sink
    pub output_file: Option<PathBuf>,
    pub identity: DocumentIdentity,
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::Elasticsearch,
            host: None,
            index: None,
            output_file: None,
            identity: DocumentIdentity::Path,
            timeout_secs: 60,
        }
    }
}

/// Batch processing files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory holding `*_directories.txt` and `*_readmes.json` files
    pub processing_directory: Option<PathBuf>,
    pub missing_metadata_file: PathBuf,
    pub reduced_missing_file: PathBuf,
    /// Parallel file readers while deduplicating
    pub worker_count: usize,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            processing_directory: None,
            missing_metadata_file: PathBuf::from("missing_metadata.txt"),
            reduced_missing_file: PathBuf::from("reduced_missing.txt"),
            worker_count: 6,
        }
    }
}

impl AppConfig {
    /// Reject combinations that cannot work at runtime
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.catalogue.live_lookups && self.catalogue.api_url.trim().is_empty() {
            return Err(ApiError::ConfigError(
                "catalogue.api_url must be set when live lookups are enabled".to_string(),
            ));
        }
        if self.files.worker_count == 0 {
            return Err(ApiError::ConfigError(
                "files.worker_count must be at least 1".to_string(),
            ));
        }
        match self.index.sink {
            SinkKind::Elasticsearch
                if self.index.host.is_none() || self.index.index.is_none() =>
            {
                Err(ApiError::ConfigError(
                    "index.host and index.index are required for the elasticsearch sink"
                        .to_string(),
                ))
            }
            SinkKind::Ndjson if self.index.output_file.is_none() => Err(ApiError::ConfigError(
                "index.output_file is required for the ndjson sink".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn processing_directory(&self) -> Result<&std::path::Path, ApiError> {
        self.files.processing_directory.as_deref().ok_or_else(|| {
            ApiError::ConfigError("files.processing_directory is not configured".to_string())
        })
    }
}
