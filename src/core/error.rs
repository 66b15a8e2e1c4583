use thiserror::Error;

/// Failures the extraction pipeline distinguishes between.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Preprocessing was handed a zero-area image.
    #[error("image has zero area ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("OCR engine error: {0}")]
    Ocr(String),

    #[error("table assembly error: {0}")]
    Table(String),

    #[error("image encode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
