use std::cmp::Ordering;

use crate::core::error::ExtractError;
use crate::core::model::{Gender, ParsedRecord, RawColumn, RawRow, RelationType, ResultTable};
use crate::parser::{
    clean_number, extract_age, extract_epic_no, extract_gender, extract_house_number,
    extract_name, extract_relative,
};

/// Filters, parses and orders raw rows into the output table.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    required: Vec<RawColumn>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new(RawColumn::ALL.to_vec())
    }
}

impl TableBuilder {
    /// A row is kept when at least one of `required` has a value. An empty
    /// list disables filtering.
    pub fn new(required: Vec<RawColumn>) -> Self {
        Self { required }
    }

    pub fn build(&self, rows: &[RawRow]) -> Result<ResultTable, ExtractError> {
        let kept: Vec<&RawRow> = rows.iter().filter(|row| self.keeps(row)).collect();
        let dropped = rows.len() - kept.len();
        if dropped > 0 {
            tracing::info!(dropped, "dropped rows with no required column");
        }

        let mut records = Columns::parse(&kept).into_records()?;
        records.sort_by(|a, b| serial_order(a.part_serial, b.part_serial));

        tracing::info!(rows = records.len(), "table built");
        Ok(ResultTable { rows: records })
    }

    fn keeps(&self, row: &RawRow) -> bool {
        self.required.is_empty() || self.required.iter().any(|column| column.is_present(row))
    }
}

/// Ascending, with rows lacking a serial after all numbered rows.
fn serial_order(a: Option<u64>, b: Option<u64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Output columns, each derived independently from its source column.
struct Columns {
    epic_no: Vec<String>,
    voter_full_name: Vec<String>,
    relative: Vec<(String, RelationType)>,
    house_no: Vec<String>,
    part_serial: Vec<Option<u64>>,
    age: Vec<Option<u64>>,
    gender: Vec<Option<Gender>>,
    page: Vec<Option<u32>>,
    box_no: Vec<Option<u32>>,
}

impl Columns {
    fn parse(rows: &[&RawRow]) -> Self {
        Self {
            epic_no: rows.iter().map(|r| extract_epic_no(&r.top_right_text)).collect(),
            voter_full_name: rows.iter().map(|r| extract_name(&r.line1)).collect(),
            relative: rows.iter().map(|r| extract_relative(&r.line2)).collect(),
            house_no: rows.iter().map(|r| extract_house_number(&r.line3)).collect(),
            part_serial: rows.iter().map(|r| clean_number(Some(r.number.as_str()))).collect(),
            age: rows.iter().map(|r| extract_age(&r.line4)).collect(),
            gender: rows.iter().map(|r| extract_gender(&r.line4)).collect(),
            page: rows.iter().map(|r| r.page).collect(),
            box_no: rows.iter().map(|r| r.box_no).collect(),
        }
    }

    fn into_records(self) -> Result<Vec<ParsedRecord>, ExtractError> {
        let len = self.epic_no.len();
        let lengths = [
            ("voter_full_name", self.voter_full_name.len()),
            ("relative", self.relative.len()),
            ("house_no", self.house_no.len()),
            ("part_serial", self.part_serial.len()),
            ("age", self.age.len()),
            ("gender", self.gender.len()),
            ("page", self.page.len()),
            ("box", self.box_no.len()),
        ];
        if let Some((name, other)) = lengths.iter().find(|(_, n)| *n != len) {
            return Err(ExtractError::Table(format!(
                "column {name} has {other} rows, expected {len}"
            )));
        }

        let mut relative = self.relative.into_iter();
        let mut voter_full_name = self.voter_full_name.into_iter();
        let mut house_no = self.house_no.into_iter();
        let mut rest = self
            .part_serial
            .into_iter()
            .zip(self.age)
            .zip(self.gender)
            .zip(self.page)
            .zip(self.box_no);

        let mut records = Vec::with_capacity(len);
        for epic_no in self.epic_no {
            let (
                (relative_name, relation_type),
                voter_full_name,
                house_no,
                ((((part_serial, age), gender), page), box_no),
            ) = match (relative.next(), voter_full_name.next(), house_no.next(), rest.next()) {
                (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
                _ => return Err(ExtractError::Table("column ended early".to_string())),
            };
            records.push(ParsedRecord {
                epic_no,
                voter_full_name,
                relative_name,
                relation_type,
                house_no,
                part_serial,
                age,
                gender,
                page,
                box_no,
            });
        }
        Ok(records)
    }
}
