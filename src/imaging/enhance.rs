use image::imageops::grayscale;
use image::{Rgb, RgbImage};

/// Scale each channel's distance from the image's mean luminance by `factor`.
///
/// A factor of 1.0 returns the image unchanged, 0.0 a flat gray image and
/// values above 1.0 stretch contrast, clamping at the channel limits.
pub fn enhance_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let pixel_count = image.width() as u64 * image.height() as u64;
    if pixel_count == 0 {
        return image.clone();
    }

    let luma_sum: u64 = grayscale(image).pixels().map(|p| p[0] as u64).sum();
    let mean = (luma_sum as f32 / pixel_count as f32).round();

    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        Rgb(p.0.map(|c| (mean + factor * (c as f32 - mean)).round().clamp(0.0, 255.0) as u8))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_factor_is_identity() {
        let image = RgbImage::from_fn(4, 4, |x, y| Rgb([(x * 40) as u8, (y * 40) as u8, 100]));
        assert_eq!(enhance_contrast(&image, 1.0), image);
    }

    #[test]
    fn doubles_distance_from_mean() {
        let mut image = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        image.put_pixel(1, 0, Rgb([200, 200, 200]));
        let out = enhance_contrast(&image, 2.0);
        assert_eq!(out.get_pixel(0, 0), &Rgb([50, 50, 50]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([250, 250, 250]));
    }
}
