pub mod recognizer;
pub mod tesseract;

use image::RgbImage;

use crate::core::error::ExtractError;

pub use recognizer::FieldRecognizer;
pub use tesseract::{TesseractCli, TesseractConfig};

/// How the engine should read a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionMode {
    /// One isolated token drawn from the digits 0-9.
    SingleDigitToken,
    /// A single uniform block of free text.
    UniformBlock,
}

impl RecognitionMode {
    /// Tesseract page segmentation mode for this recognition mode.
    pub fn page_segmentation_mode(&self) -> u8 {
        match self {
            RecognitionMode::SingleDigitToken => 10,
            RecognitionMode::UniformBlock => 6,
        }
    }
}

/// Any OCR backend: pixels and a mode in, newline-delimited text out.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &RgbImage, mode: RecognitionMode) -> Result<String, ExtractError>;
}
