pub mod csv_export;
pub mod json_export;

use anyhow::Result;

use crate::core::model::ExtractedDocument;

pub use csv_export::{read_raw_csv, CsvExporter};
pub use json_export::JsonExporter;

pub trait Exporter {
    fn export(&self, document: &ExtractedDocument) -> Result<()>;
}
