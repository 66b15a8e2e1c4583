use image::RgbImage;

use crate::core::config::ImageParams;
use crate::core::error::ExtractError;
use crate::core::geometry::Rect;
use crate::core::model::RawBoxRecord;
use crate::imaging::{crop, remove_watermark};
use crate::ocr::FieldRecognizer;

/// Gap between the serial-number box and the identifier code to its right.
const TOP_RIGHT_GAP: u32 = 10;
/// Margin kept around the main text block.
const TEXT_MARGIN: u32 = 5;

/// Turns one record rectangle into a [`RawBoxRecord`].
#[derive(Clone, Copy)]
pub struct RecordAssembler<'a> {
    recognizer: FieldRecognizer<'a>,
    params: &'a ImageParams,
}

impl<'a> RecordAssembler<'a> {
    pub fn new(recognizer: FieldRecognizer<'a>, params: &'a ImageParams) -> Self {
        Self { recognizer, params }
    }

    /// Crop, clean and read one record. `inner` is relative to `record`.
    ///
    /// Never fails: any error degrades the record to all-empty fields so the
    /// rest of the page keeps going.
    pub fn assemble(&self, page: &RgbImage, record: Rect, inner: Rect) -> RawBoxRecord {
        match self.try_assemble(page, record, inner) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(?record, ?inner, error = %err, "record degraded to empty fields");
                RawBoxRecord::default()
            }
        }
    }

    fn try_assemble(
        &self,
        page: &RgbImage,
        record: Rect,
        inner: Rect,
    ) -> Result<RawBoxRecord, ExtractError> {
        let region = crop(page, record);
        let clean = remove_watermark(&region, self.params.contour_area_threshold)?;
        let (w, h) = clean.dimensions();

        let number = self.recognizer.recognize_number(&clean, inner)?;

        let top_right = top_right_region(inner, w);
        let top_right_text = self.recognizer.recognize_text(&clean, top_right)?;

        let block = text_block_region(inner, w, h);
        let text = self.recognizer.recognize_text(&clean, block)?;

        Ok(RawBoxRecord::from_text_block(number, top_right_text, &text))
    }
}

/// Everything right of the serial-number box, within its height.
fn top_right_region(inner: Rect, record_width: u32) -> Rect {
    let x = inner.width + TOP_RIGHT_GAP;
    Rect::new(x, 0, record_width.saturating_sub(x), inner.height)
}

/// The four text lines below the serial-number box, over two thirds of the width.
fn text_block_region(inner: Rect, record_width: u32, record_height: u32) -> Rect {
    let y = inner.bottom() + TEXT_MARGIN;
    Rect::new(
        TEXT_MARGIN,
        y,
        record_width * 2 / 3,
        record_height.saturating_sub(y + TEXT_MARGIN),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{OcrEngine, RecognitionMode};
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect as DrawRect;
    use pretty_assertions::assert_eq;

    struct FixedEngine;

    impl OcrEngine for FixedEngine {
        fn recognize(&self, _: &RgbImage, mode: RecognitionMode) -> Result<String, ExtractError> {
            Ok(match mode {
                RecognitionMode::SingleDigitToken => "17".to_string(),
                RecognitionMode::UniformBlock => {
                    "Name : Asha Devi\nHusband's Name: Raj\n\nHouse Number : 4\nAge : 31 Gender : Female\nextra"
                        .to_string()
                }
            })
        }
    }

    struct FailingEngine;

    impl OcrEngine for FailingEngine {
        fn recognize(&self, _: &RgbImage, _: RecognitionMode) -> Result<String, ExtractError> {
            Err(ExtractError::Ocr("engine crashed".to_string()))
        }
    }

    fn record_page() -> RgbImage {
        let mut page = RgbImage::from_pixel(200, 120, Rgb([255, 255, 255]));
        // A thin digit stroke, small enough to survive watermark removal.
        draw_filled_rect_mut(&mut page, DrawRect::at(40, 12).of_size(2, 10), Rgb([0, 0, 0]));
        page
    }

    #[test]
    fn regions_follow_the_record_layout() {
        let inner = Rect::new(3, 4, 50, 30);
        assert_eq!(top_right_region(inner, 180), Rect::new(60, 0, 120, 30));
        assert_eq!(text_block_region(inner, 180, 120), Rect::new(5, 39, 120, 76));
        assert_eq!(text_block_region(inner, 180, 40).height, 0);
    }

    #[test]
    fn assembles_fixed_shape_record() {
        let params = ImageParams::default();
        let engine = FixedEngine;
        let assembler = RecordAssembler::new(FieldRecognizer::new(&engine, &params), &params);

        let raw = assembler.assemble(&record_page(), Rect::new(0, 0, 200, 120), Rect::new(2, 2, 60, 30));
        assert_eq!(raw.number, "17");
        assert_eq!(raw.line1, "Name : Asha Devi");
        assert_eq!(raw.line2, "Husband's Name: Raj");
        assert_eq!(raw.line3, "House Number : 4");
        assert_eq!(raw.line4, "Age : 31 Gender : Female");
    }

    #[test]
    fn engine_failure_yields_empty_record() {
        let params = ImageParams::default();
        let engine = FailingEngine;
        let assembler = RecordAssembler::new(FieldRecognizer::new(&engine, &params), &params);

        let raw = assembler.assemble(&record_page(), Rect::new(0, 0, 200, 120), Rect::new(2, 2, 60, 30));
        assert_eq!(raw, RawBoxRecord::default());
    }

    #[test]
    fn watermark_failure_yields_empty_record() {
        let params = ImageParams::default();
        let engine = FixedEngine;
        let assembler = RecordAssembler::new(FieldRecognizer::new(&engine, &params), &params);

        // Record lies entirely outside the page: the crop is empty and
        // watermark removal rejects it.
        let raw = assembler.assemble(&record_page(), Rect::new(500, 500, 50, 50), Rect::new(0, 0, 10, 10));
        assert!(raw.is_blank());
    }
}
