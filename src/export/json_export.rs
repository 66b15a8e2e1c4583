use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::ExtractedDocument;
use crate::export::Exporter;

pub const TABLE_JSON: &str = "table.json";

/// Writes the parsed table as a pretty-printed JSON array of rows.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for JsonExporter {
    fn export(&self, document: &ExtractedDocument) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(TABLE_JSON);
        let data = serde_json::to_string_pretty(&document.table.rows)?;
        fs::write(path, data)?;
        Ok(())
    }
}
