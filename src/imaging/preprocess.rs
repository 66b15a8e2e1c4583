use image::imageops::grayscale;
use image::{GrayImage, RgbImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

use crate::core::config::ImageParams;
use crate::core::error::ExtractError;
use crate::imaging::denoise::non_local_means;

/// Produce the binary mask used for contour search: grayscale, non-local
/// means denoising, then an inverted Otsu threshold so dark ink becomes
/// foreground (255) on a background of 0.
pub fn binarize_page(image: &RgbImage, params: &ImageParams) -> Result<GrayImage, ExtractError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ExtractError::EmptyImage { width, height });
    }

    let gray = grayscale(image);
    let denoised = non_local_means(
        &gray,
        params.denoising_strength,
        params.template_window_size,
        params.search_window_size,
    );
    let level = otsu_level(&denoised);
    tracing::debug!(width, height, level, "binarized page");
    Ok(threshold(&denoised, level, ThresholdType::BinaryInverted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn fast_params() -> ImageParams {
        ImageParams {
            template_window_size: 3,
            search_window_size: 5,
            ..ImageParams::default()
        }
    }

    #[test]
    fn rejects_empty_image() {
        let err = binarize_page(&RgbImage::new(0, 10), &fast_params()).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyImage { width: 0, height: 10 }));
    }

    #[test]
    fn dark_ink_becomes_foreground() {
        let image = RgbImage::from_fn(30, 30, |x, y| {
            if (10..20).contains(&x) && (10..20).contains(&y) {
                Rgb([15, 15, 15])
            } else {
                Rgb([245, 245, 245])
            }
        });
        let binary = binarize_page(&image, &fast_params()).unwrap();
        assert_eq!(binary.get_pixel(15, 15)[0], 255);
        assert_eq!(binary.get_pixel(2, 2)[0], 0);
    }
}
