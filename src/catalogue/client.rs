//! Catalogue service clients.

use super::record::CatalogueRecord;
use crate::error::ApiError;
use std::time::Duration;
use tracing::debug;

/// Default catalogue endpoint; the archive path is appended verbatim
pub const DEFAULT_API_URL: &str = "https://catalogue.ceda.ac.uk/api/v0/obs/get_info";

/// Live lookup of catalogue metadata for one archive path.
///
/// `Ok(None)` means the service answered but has no usable record. `Err` is
/// reserved for transport and decoding failures; callers treat both the same.
pub trait CatalogueService: Send + Sync {
    fn lookup(&self, archive_path: &str) -> Result<Option<CatalogueRecord>, ApiError>;
}

/// Blocking HTTP client for the catalogue `get_info` endpoint
pub struct HttpCatalogueService {
    client: reqwest::blocking::Client,
    api_url: String,
}

impl HttpCatalogueService {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ApiError::CatalogueError(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn request_url(&self, archive_path: &str) -> String {
        format!("{}{}", self.api_url, archive_path)
    }
}

impl CatalogueService for HttpCatalogueService {
    fn lookup(&self, archive_path: &str) -> Result<Option<CatalogueRecord>, ApiError> {
        let url = self.request_url(archive_path);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ApiError::CatalogueError(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            debug!(url = %url, status = %response.status(), "Catalogue returned no record");
            return Ok(None);
        }

        let body = response.text().map_err(|e| {
            ApiError::CatalogueError(format!("Failed to read response from {}: {}", url, e))
        })?;
        parse_lookup_body(&body)
            .map_err(|e| ApiError::CatalogueError(format!("Malformed response from {}: {}", url, e)))
    }
}

/// Decode a `get_info` body. JSON `null` or an object without a usable title
/// is "no record".
pub fn parse_lookup_body(body: &str) -> Result<Option<CatalogueRecord>, serde_json::Error> {
    let record: Option<CatalogueRecord> = serde_json::from_str(body)?;
    Ok(record.filter(|r| r.title().is_some()))
}
