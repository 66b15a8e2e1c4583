pub mod core;
pub mod export;
pub mod extract;
pub mod imaging;
pub mod input;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod table;

pub use core::model::{ExtractedDocument, ParsedRecord, RawBoxRecord, RawRow, ResultTable};
