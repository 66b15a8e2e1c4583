pub mod contour;
pub mod debug_draw;
pub mod denoise;
pub mod enhance;
pub mod inpaint;
pub mod locator;
pub mod preprocess;
pub mod watermark;

use image::imageops::crop_imm;
use image::RgbImage;

use crate::core::geometry::Rect;

pub use locator::{BoxLocator, PageLayout};
pub use preprocess::binarize_page;
pub use watermark::remove_watermark;

/// Copy the part of `image` covered by `rect`, clipped to the image bounds.
pub fn crop(image: &RgbImage, rect: Rect) -> RgbImage {
    let r = rect.clamp_to(image.width(), image.height());
    crop_imm(image, r.x, r.y, r.width, r.height).to_image()
}
