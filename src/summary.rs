//! Run summaries printed at the end of every command.

use crate::tree::DirectoryRecord;
use comfy_table::{presets::UTF8_FULL, Table};

/// Counts for a traversal-style run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub directories: usize,
    pub with_metadata: usize,
    pub without_metadata: usize,
    pub readmes: usize,
}

impl RunSummary {
    pub fn observe(&mut self, record: &DirectoryRecord) {
        self.directories += 1;
        if record.has_title() {
            self.with_metadata += 1;
        } else {
            self.without_metadata += 1;
        }
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a DirectoryRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.observe(record);
        }
        summary
    }

    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Directories found", self.directories.to_string()),
            ("With catalogue metadata", self.with_metadata.to_string()),
            ("Without catalogue metadata", self.without_metadata.to_string()),
            ("00README files captured", self.readmes.to_string()),
        ]
    }
}

/// Two-column table of label/value rows
pub fn render_table(title: &str, rows: &[(&str, String)]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![title, ""]);
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value.clone()]);
    }
    table.to_string()
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", render_table("Run summary", &self.rows()))
    }
}
