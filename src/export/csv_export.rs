use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::model::{ExtractedDocument, RawRow};
use crate::export::Exporter;

pub const RAW_CSV: &str = "raw.csv";
pub const PROCESSED_CSV: &str = "processed.csv";

/// Writes `raw.csv` (one row per recognized box) and `processed.csv` (the
/// parsed table).
#[derive(Debug, Clone)]
pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for CsvExporter {
    fn export(&self, document: &ExtractedDocument) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        write_csv(&self.out_dir.join(RAW_CSV), &document.raw)?;
        write_csv(&self.out_dir.join(PROCESSED_CSV), &document.table.rows)?;
        Ok(())
    }
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_rows(file, rows).with_context(|| format!("failed to write {}", path.display()))
}

fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

/// Read raw rows back from a `raw.csv` written by [`CsvExporter`].
pub fn read_raw_csv(path: &Path) -> Result<Vec<RawRow>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_raw_rows(file).with_context(|| format!("failed to read raw rows from {}", path.display()))
}

pub fn read_raw_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let r = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in r.into_deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Gender, ParsedRecord, RelationType};
    use pretty_assertions::assert_eq;

    #[test]
    fn raw_rows_survive_a_write_and_read() {
        let rows = vec![
            RawRow {
                number: "4".to_string(),
                top_right_text: "XYZ0001".to_string(),
                line1: "Name: Asha, Devi".to_string(),
                line2: "Husband's Name: \"Raj\"".to_string(),
                page: Some(1),
                box_no: Some(3),
                ..RawRow::default()
            },
            RawRow::default(),
        ];

        let mut buf = Vec::new();
        write_rows(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("number,top_right_text,line1,line2,line3,line4,page,box\n"));

        assert_eq!(read_raw_rows(buf.as_slice()).unwrap(), rows);
    }

    #[test]
    fn processed_rows_use_table_headers_and_empty_nulls() {
        let rows = [ParsedRecord {
            epic_no: "ABC1".to_string(),
            voter_full_name: "Ravi".to_string(),
            relative_name: "Mohan".to_string(),
            relation_type: RelationType::Father,
            house_no: "-".to_string(),
            part_serial: Some(12),
            age: None,
            gender: Some(Gender::Male),
            page: Some(1),
            box_no: None,
        }];

        let mut buf = Vec::new();
        write_rows(&mut buf, &rows).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "EPIC No,Voter Full Name,Relative's Name,Relation Type,House No,Part S.No,Age,Gender,Page,Box\n\
             ABC1,Ravi,Mohan,FTHR,-,12,,M,1,\n"
        );
    }
}
