//! Catalogue record types.

use serde::{Deserialize, Serialize};

/// Raw metadata entry as returned by the catalogue service and stored in the
/// mapping snapshot. Keys this crate does not read are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogueRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,

    /// Generic record type used by older service responses
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub generic_type: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CatalogueRecord {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    /// Title, if present and non-empty
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Resolved metadata, or `None` when the record has no usable title
    pub fn metadata(&self) -> Option<CatalogueMetadata> {
        let title = self.title()?;
        Some(CatalogueMetadata {
            title: title.to_string(),
            external_url: non_empty(&self.url).or_else(|| non_empty(&self.uuid)),
            record_type: non_empty(&self.record_type).or_else(|| non_empty(&self.generic_type)),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Metadata spliced into a directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueMetadata {
    pub title: String,
    pub external_url: Option<String>,
    pub record_type: Option<String>,
}
