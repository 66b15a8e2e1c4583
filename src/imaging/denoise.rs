//! Non-local means denoising for single-channel images.
//!
//! Each output pixel is a weighted mean of the pixels in its search window,
//! weighted by how similar the template patch around each candidate is to
//! the patch around the pixel itself. Patch distances are computed per
//! search offset with an integral image, so the cost is independent of the
//! template size.

use image::{GrayImage, Luma};
use rayon::prelude::*;

/// Denoise `image` with filter strength `h`.
///
/// `template_window` and `search_window` are rounded down to odd sizes.
/// A non-positive strength returns the input unchanged.
pub fn non_local_means(
    image: &GrayImage,
    h: f32,
    template_window: u32,
    search_window: u32,
) -> GrayImage {
    let (width, height) = image.dimensions();
    if h <= 0.0 || width == 0 || height == 0 {
        return image.clone();
    }

    let t_radius = (template_window.max(1) / 2) as usize;
    let s_radius = (search_window.max(1) / 2) as usize;
    let w = width as usize;
    let h_px = height as usize;

    let pad = t_radius + s_radius;
    let padded = PaddedImage::reflect(image, pad);

    // Region of padded coordinates whose patches we compare: every output
    // pixel plus the template radius around it.
    let region_w = w + 2 * t_radius;
    let region_h = h_px + 2 * t_radius;
    let patch_len = ((2 * t_radius + 1) * (2 * t_radius + 1)) as f32;
    let inv_h2 = 1.0 / (h * h);

    let mut integral = vec![0u64; (region_w + 1) * (region_h + 1)];
    let mut acc = vec![(0.0f32, 0.0f32); w * h_px];

    let s = s_radius as isize;
    for dy in -s..=s {
        for dx in -s..=s {
            fill_sq_diff_integral(&padded, s_radius, dx, dy, region_w, region_h, &mut integral);

            let integral = &integral;
            acc.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    let patch = rect_sum(integral, region_w + 1, x, y, 2 * t_radius + 1);
                    let dist = patch as f32 / patch_len;
                    let weight = (-dist * inv_h2).exp();
                    let cx = (x + pad) as isize + dx;
                    let cy = (y + pad) as isize + dy;
                    let value = padded.get(cx as usize, cy as usize) as f32;
                    cell.0 += weight;
                    cell.1 += weight * value;
                }
            });
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let (weight, value) = acc[y as usize * w + x as usize];
        let mean = if weight > 0.0 { value / weight } else { 0.0 };
        Luma([mean.round().clamp(0.0, 255.0) as u8])
    })
}

/// Build the integral image of squared differences between the padded image
/// and itself shifted by `(dx, dy)`, over the comparison region.
fn fill_sq_diff_integral(
    padded: &PaddedImage,
    s_radius: usize,
    dx: isize,
    dy: isize,
    region_w: usize,
    region_h: usize,
    integral: &mut [u64],
) {
    let stride = region_w + 1;
    for y in 0..region_h {
        let mut row_sum = 0u64;
        let py = y + s_radius;
        let qy = (py as isize + dy) as usize;
        for x in 0..region_w {
            let px = x + s_radius;
            let qx = (px as isize + dx) as usize;
            let diff = padded.get(px, py) as i32 - padded.get(qx, qy) as i32;
            row_sum += (diff * diff) as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }
}

fn rect_sum(integral: &[u64], stride: usize, x: usize, y: usize, side: usize) -> u64 {
    let a = integral[y * stride + x];
    let b = integral[y * stride + x + side];
    let c = integral[(y + side) * stride + x];
    let d = integral[(y + side) * stride + x + side];
    d + a - b - c
}

/// Copy of an image with a reflected border (`dcb|abcd|cba`).
struct PaddedImage {
    data: Vec<u8>,
    stride: usize,
}

impl PaddedImage {
    fn reflect(image: &GrayImage, pad: usize) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 2 * pad;
        let rows = h + 2 * pad;
        let mut data = vec![0u8; stride * rows];
        for y in 0..rows {
            let sy = reflect_101(y as isize - pad as isize, h);
            for x in 0..stride {
                let sx = reflect_101(x as isize - pad as isize, w);
                data[y * stride + x] = image.get_pixel(sx as u32, sy as u32)[0];
            }
        }
        Self { data, stride }
    }

    fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }
}

fn reflect_101(mut i: isize, len: usize) -> usize {
    let n = len as isize;
    if n == 1 {
        return 0;
    }
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_indices() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-3, 5), 3);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-4, 1), 0);
    }

    #[test]
    fn flat_image_is_unchanged() {
        let image = GrayImage::from_pixel(16, 12, Luma([137]));
        let out = non_local_means(&image, 10.0, 3, 7);
        assert!(out.pixels().all(|p| p[0] == 137));
    }

    #[test]
    fn strong_edges_survive() {
        let image = GrayImage::from_fn(20, 20, |x, _| if x < 10 { Luma([0]) } else { Luma([255]) });
        let out = non_local_means(&image, 10.0, 3, 7);
        assert!(out.get_pixel(5, 10)[0] < 10);
        assert!(out.get_pixel(15, 10)[0] > 245);
    }

    #[test]
    fn isolated_speck_is_smoothed() {
        let mut image = GrayImage::from_pixel(21, 21, Luma([200]));
        image.put_pixel(10, 10, Luma([190]));
        let out = non_local_means(&image, 30.0, 3, 9);
        assert!(out.get_pixel(10, 10)[0] > 190);
    }
}
