//! 00README capture.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Name of the descriptive file looked for in every visited directory
pub const README_FILE_NAME: &str = "00README";

/// How invalid UTF-8 in a descriptive file is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadmeDecoding {
    /// Each invalid sequence becomes U+FFFD
    #[default]
    Replace,
    /// Invalid sequences are dropped
    Ignore,
}

impl ReadmeDecoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len());
        for chunk in bytes.utf8_chunks() {
            out.push_str(chunk.valid());
            if !chunk.invalid().is_empty() && self == ReadmeDecoding::Replace {
                out.push(char::REPLACEMENT_CHARACTER);
            }
        }
        out
    }
}

/// Reads `00README` files with a fixed decoding policy
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadmeReader {
    decoding: ReadmeDecoding,
}

impl ReadmeReader {
    pub fn new(decoding: ReadmeDecoding) -> Self {
        Self { decoding }
    }

    /// Content of `<dir>/00README`, or `None` when there is no such file or
    /// it cannot be read.
    pub fn read(&self, dir: &Path) -> Option<String> {
        let file = dir.join(README_FILE_NAME);
        if !file.is_file() {
            return None;
        }
        match std::fs::read(&file) {
            Ok(bytes) => Some(self.decoding.decode(&bytes)),
            Err(e) => {
                warn!("Failed to read {}: {}", file.display(), e);
                None
            }
        }
    }
}

/// Descriptive text captured during one traversal, keyed by literal path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadmeStore {
    entries: BTreeMap<String, String>,
}

impl ReadmeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, text: String) {
        self.entries.insert(path.to_string(), text);
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }
}
