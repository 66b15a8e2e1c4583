use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::ExtractError;

/// Number of free-text lines every record carries below its header.
pub const RECORD_LINES: usize = 4;

/// Raw OCR output for one record box.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawBoxRecord {
    pub number: String,
    pub top_right_text: String,
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub line4: String,
}

impl RawBoxRecord {
    /// Build a record from the recognized text block.
    ///
    /// The block is split into non-empty trimmed lines and normalized to
    /// exactly [`RECORD_LINES`] entries: short blocks are padded with empty
    /// strings, extra lines are dropped. Downstream parsing relies on the
    /// fixed shape.
    pub fn from_text_block(number: String, top_right_text: String, block: &str) -> Self {
        let [line1, line2, line3, line4] = normalize_lines(block);
        Self {
            number,
            top_right_text,
            line1,
            line2,
            line3,
            line4,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.number.is_empty()
            && self.top_right_text.is_empty()
            && self.line1.is_empty()
            && self.line2.is_empty()
            && self.line3.is_empty()
            && self.line4.is_empty()
    }

    pub fn with_provenance(self, page: Option<u32>, box_no: Option<u32>) -> RawRow {
        RawRow {
            number: self.number,
            top_right_text: self.top_right_text,
            line1: self.line1,
            line2: self.line2,
            line3: self.line3,
            line4: self.line4,
            page,
            box_no,
        }
    }
}

fn normalize_lines(block: &str) -> [String; RECORD_LINES] {
    let mut lines = block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string);
    std::array::from_fn(|_| lines.next().unwrap_or_default())
}

/// A raw record together with where it was found. This is the row shape of
/// the raw CSV output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawRow {
    pub number: String,
    pub top_right_text: String,
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub line4: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(rename = "box", default)]
    pub box_no: Option<u32>,
}

/// Raw columns a table row can be required to carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RawColumn {
    Number,
    TopRightText,
    Line1,
    Line2,
    Line3,
    Line4,
    Page,
    Box,
}

impl RawColumn {
    pub const ALL: [RawColumn; 8] = [
        RawColumn::Number,
        RawColumn::TopRightText,
        RawColumn::Line1,
        RawColumn::Line2,
        RawColumn::Line3,
        RawColumn::Line4,
        RawColumn::Page,
        RawColumn::Box,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RawColumn::Number => "number",
            RawColumn::TopRightText => "top_right_text",
            RawColumn::Line1 => "line1",
            RawColumn::Line2 => "line2",
            RawColumn::Line3 => "line3",
            RawColumn::Line4 => "line4",
            RawColumn::Page => "page",
            RawColumn::Box => "box",
        }
    }

    /// Whether `row` carries a non-empty value in this column.
    pub fn is_present(&self, row: &RawRow) -> bool {
        match self {
            RawColumn::Number => !row.number.is_empty(),
            RawColumn::TopRightText => !row.top_right_text.is_empty(),
            RawColumn::Line1 => !row.line1.is_empty(),
            RawColumn::Line2 => !row.line2.is_empty(),
            RawColumn::Line3 => !row.line3.is_empty(),
            RawColumn::Line4 => !row.line4.is_empty(),
            RawColumn::Page => row.page.is_some(),
            RawColumn::Box => row.box_no.is_some(),
        }
    }
}

impl fmt::Display for RawColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RawColumn {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RawColumn::ALL
            .into_iter()
            .find(|column| column.name() == s.trim())
            .ok_or_else(|| ExtractError::Table(format!("unknown raw column '{s}'")))
    }
}

/// Coded category of the relative listed on a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RelationType {
    #[serde(rename = "FTHR")]
    Father,
    #[serde(rename = "HSBN")]
    Husband,
    #[serde(rename = "OTHR")]
    Other,
    #[default]
    #[serde(rename = "")]
    Unknown,
}

impl RelationType {
    pub fn code(&self) -> &'static str {
        match self {
            RelationType::Father => "FTHR",
            RelationType::Husband => "HSBN",
            RelationType::Other => "OTHR",
            RelationType::Unknown => "",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

/// One structured row of the output table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedRecord {
    #[serde(rename = "EPIC No")]
    pub epic_no: String,
    #[serde(rename = "Voter Full Name")]
    pub voter_full_name: String,
    #[serde(rename = "Relative's Name")]
    pub relative_name: String,
    #[serde(rename = "Relation Type")]
    pub relation_type: RelationType,
    #[serde(rename = "House No")]
    pub house_no: String,
    #[serde(rename = "Part S.No")]
    pub part_serial: Option<u64>,
    #[serde(rename = "Age")]
    pub age: Option<u64>,
    #[serde(rename = "Gender")]
    pub gender: Option<Gender>,
    #[serde(rename = "Page")]
    pub page: Option<u32>,
    #[serde(rename = "Box")]
    pub box_no: Option<u32>,
}

/// Parsed records, filtered and ordered by serial number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultTable {
    pub rows: Vec<ParsedRecord>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything extracted from one input: the raw rows as recognized and the
/// table built from them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub raw: Vec<RawRow>,
    pub table: ResultTable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pads_short_text_blocks_to_four_lines() {
        let record =
            RawBoxRecord::from_text_block("1".into(), "ABC".into(), "Name Ravi\n\n  \nAge: 40");
        assert_eq!(record.line1, "Name Ravi");
        assert_eq!(record.line2, "Age: 40");
        assert_eq!(record.line3, "");
        assert_eq!(record.line4, "");
    }

    #[test]
    fn truncates_extra_lines() {
        let record = RawBoxRecord::from_text_block(String::new(), String::new(), "a\nb\nc\nd\ne\nf");
        assert_eq!(
            [record.line1, record.line2, record.line3, record.line4],
            ["a", "b", "c", "d"].map(String::from)
        );
    }

    #[test]
    fn only_records_without_any_text_are_blank() {
        assert!(RawBoxRecord::default().is_blank());
        assert!(RawBoxRecord::from_text_block(String::new(), String::new(), "\n \n").is_blank());
        assert!(!RawBoxRecord::from_text_block("7".into(), String::new(), "").is_blank());
    }

    #[test]
    fn parses_column_names() {
        assert_eq!("top_right_text".parse::<RawColumn>().unwrap(), RawColumn::TopRightText);
        assert_eq!(" box ".parse::<RawColumn>().unwrap(), RawColumn::Box);
        assert!("EPIC No".parse::<RawColumn>().is_err());
    }

    #[test]
    fn relation_codes_serialize_as_short_codes() {
        let json = serde_json::to_string(&[RelationType::Father, RelationType::Unknown]).unwrap();
        assert_eq!(json, r#"["FTHR",""]"#);
    }
}
