//! Watermark suppression for cropped record regions.
//!
//! Watermark ink is diffuse: after dilation it merges into large connected
//! blobs, while printed and handwritten strokes stay thin and fragmented.
//! Blobs above the configured area are filled into a mask and reconstructed
//! from the surrounding paper.

use image::imageops::grayscale;
use image::{GrayImage, RgbImage};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;

use crate::core::error::ExtractError;
use crate::imaging::contour::{contour_area, external_contours, fill_contour};
use crate::imaging::inpaint::inpaint_telea;

/// Pixels at or below this gray level count as ink.
pub const INK_LEVEL: u8 = 180;
/// Each pass grows the mask by one pixel in every direction (3x3 square).
pub const DILATE_ITERATIONS: u8 = 2;
pub const INPAINT_RADIUS: f32 = 3.0;

pub fn remove_watermark(region: &RgbImage, area_threshold: f64) -> Result<RgbImage, ExtractError> {
    let (width, height) = region.dimensions();
    if width == 0 || height == 0 {
        return Err(ExtractError::EmptyImage { width, height });
    }

    let mask = watermark_mask(region, area_threshold);
    Ok(inpaint_telea(region, &mask, INPAINT_RADIUS))
}

/// Mask of the dilated ink blobs whose enclosed area exceeds `area_threshold`.
pub fn watermark_mask(region: &RgbImage, area_threshold: f64) -> GrayImage {
    let ink = threshold(&grayscale(region), INK_LEVEL, ThresholdType::BinaryInverted);
    let dilated = dilate(&ink, Norm::LInf, DILATE_ITERATIONS);

    let mut mask = GrayImage::new(region.width(), region.height());
    let mut blobs = 0usize;
    for contour in external_contours(&dilated) {
        if contour_area(&contour) > area_threshold {
            fill_contour(&mut mask, &contour, 255);
            blobs += 1;
        }
    }
    tracing::trace!(blobs, "watermark mask built");
    mask
}
