use image::imageops::{crop_imm, grayscale};
use image::RgbImage;
use imageproc::contrast::{threshold, ThresholdType};

use crate::core::config::ImageParams;
use crate::core::error::ExtractError;
use crate::core::geometry::Rect;
use crate::imaging::crop;
use crate::imaging::enhance::enhance_contrast;
use crate::ocr::{OcrEngine, RecognitionMode};

/// Pixels at or below this gray level count as digit ink.
pub const DIGIT_INK_LEVEL: u8 = 200;
/// Columns kept to the right of the rightmost ink column.
pub const DIGIT_RIGHT_MARGIN: u32 = 5;

/// Runs the OCR engine on sub-regions of a record image.
#[derive(Clone, Copy)]
pub struct FieldRecognizer<'a> {
    engine: &'a dyn OcrEngine,
    params: &'a ImageParams,
}

impl<'a> FieldRecognizer<'a> {
    pub fn new(engine: &'a dyn OcrEngine, params: &'a ImageParams) -> Self {
        Self { engine, params }
    }

    /// Read the right-aligned serial number inside `rect`.
    ///
    /// Returns an empty string without calling the engine when the region
    /// holds no ink.
    pub fn recognize_number(&self, image: &RgbImage, rect: Rect) -> Result<String, ExtractError> {
        let region = crop(image, rect);
        if region.width() == 0 || region.height() == 0 {
            return Ok(String::new());
        }

        let enhanced = enhance_contrast(&region, self.params.contrast_enhancement);
        let ink = threshold(&grayscale(&enhanced), DIGIT_INK_LEVEL, ThresholdType::BinaryInverted);

        let mut column_sums = vec![0u32; ink.width() as usize];
        for (x, _, p) in ink.enumerate_pixels() {
            column_sums[x as usize] += p[0] as u32;
        }
        let Some(rightmost) = column_sums.iter().rposition(|&sum| sum > 0) else {
            return Ok(String::new());
        };

        let rightmost = rightmost as u32;
        let start = rightmost.saturating_sub(self.params.number_crop_width);
        let end = (rightmost + DIGIT_RIGHT_MARGIN).min(enhanced.width());
        let window = crop_imm(&enhanced, start, 0, end - start, enhanced.height()).to_image();

        tracing::debug!(?rect, start, end, "recognizing serial number");
        let text = self
            .engine
            .recognize(&window, RecognitionMode::SingleDigitToken)?;
        Ok(text.trim().to_string())
    }

    /// Read `rect` as one uniform block of text, returned as the engine gave it.
    pub fn recognize_text(&self, image: &RgbImage, rect: Rect) -> Result<String, ExtractError> {
        let region = crop(image, rect);
        if region.width() == 0 || region.height() == 0 {
            return Ok(String::new());
        }
        tracing::debug!(?rect, "recognizing text block");
        self.engine.recognize(&region, RecognitionMode::UniformBlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect as DrawRect;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Records the size of every region it is asked to read.
    #[derive(Default)]
    struct RecordingEngine {
        calls: Mutex<Vec<(u32, u32, RecognitionMode)>>,
    }

    impl OcrEngine for RecordingEngine {
        fn recognize(&self, image: &RgbImage, mode: RecognitionMode) -> Result<String, ExtractError> {
            self.calls
                .lock()
                .unwrap()
                .push((image.width(), image.height(), mode));
            Ok(match mode {
                RecognitionMode::SingleDigitToken => " 42\n".to_string(),
                RecognitionMode::UniformBlock => "Name Ravi\nAge: 40".to_string(),
            })
        }
    }

    #[test]
    fn blank_number_box_skips_the_engine() {
        let engine = RecordingEngine::default();
        let params = ImageParams::default();
        let recognizer = FieldRecognizer::new(&engine, &params);
        let image = RgbImage::from_pixel(80, 30, Rgb([255, 255, 255]));

        let number = recognizer.recognize_number(&image, Rect::new(0, 0, 80, 30)).unwrap();
        assert_eq!(number, "");
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn number_window_ends_at_rightmost_ink() {
        let engine = RecordingEngine::default();
        let params = ImageParams::default();
        let recognizer = FieldRecognizer::new(&engine, &params);
        let mut image = RgbImage::from_pixel(100, 30, Rgb([255, 255, 255]));
        draw_filled_rect_mut(&mut image, DrawRect::at(60, 8).of_size(10, 14), Rgb([0, 0, 0]));

        let number = recognizer.recognize_number(&image, Rect::new(0, 0, 100, 30)).unwrap();
        assert_eq!(number, "42");

        // Rightmost ink column is 69: window spans 39..74.
        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(35, 30, RecognitionMode::SingleDigitToken)]);
    }

    #[test]
    fn text_is_returned_verbatim() {
        let engine = RecordingEngine::default();
        let params = ImageParams::default();
        let recognizer = FieldRecognizer::new(&engine, &params);
        let image = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));

        let text = recognizer.recognize_text(&image, Rect::new(5, 5, 30, 20)).unwrap();
        assert_eq!(text, "Name Ravi\nAge: 40");
        assert_eq!(
            engine.calls.lock().unwrap().as_slice(),
            &[(30, 20, RecognitionMode::UniformBlock)]
        );

        let empty = recognizer.recognize_text(&image, Rect::new(60, 5, 30, 20)).unwrap();
        assert_eq!(empty, "");
    }
}
