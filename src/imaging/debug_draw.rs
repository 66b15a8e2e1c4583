//! Box overlays for visual inspection of detection results.

use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect as DrawRect;

use crate::core::geometry::Rect;

const NORMAL: Rgb<u8> = Rgb([0, 255, 0]);
const CURRENT: Rgb<u8> = Rgb([255, 0, 0]);
const INNER: Rgb<u8> = Rgb([0, 0, 255]);
const LABEL_SCALE: f32 = 18.0;

/// Draw every record box with its 1-based index on a copy of `page`.
///
/// The box at `current` is drawn thicker in red; `inner` is that box's inner
/// rectangle (relative to it) and is drawn in blue. Labels are only drawn
/// when a font is available.
pub fn draw_boxes(
    page: &RgbImage,
    boxes: &[Rect],
    current: Option<usize>,
    inner: Option<Rect>,
    font: Option<&FontVec>,
) -> RgbImage {
    let mut canvas = page.clone();

    for (i, rect) in boxes.iter().enumerate() {
        let is_current = current == Some(i);
        let (color, thickness) = if is_current { (CURRENT, 2) } else { (NORMAL, 1) };
        outline(&mut canvas, rect, color, thickness);

        if let Some(font) = font {
            let label = format!("{}", i + 1);
            draw_text_mut(
                &mut canvas,
                color,
                rect.x as i32 + 5,
                rect.y as i32 + 5,
                LABEL_SCALE,
                font,
                &label,
            );
        }
    }

    if let (Some(i), Some(inner)) = (current, inner) {
        if let Some(outer) = boxes.get(i) {
            outline(&mut canvas, &outer.offset_child(&inner), INNER, 2);
        }
    }

    canvas
}

fn outline(canvas: &mut RgbImage, rect: &Rect, color: Rgb<u8>, thickness: u32) {
    for t in 0..thickness {
        let w = rect.width.saturating_sub(2 * t);
        let h = rect.height.saturating_sub(2 * t);
        if w == 0 || h == 0 {
            break;
        }
        let r = DrawRect::at((rect.x + t) as i32, (rect.y + t) as i32).of_size(w, h);
        draw_hollow_rect_mut(canvas, r, color);
    }
}

/// Load a label font from common system locations.
pub fn load_label_font() -> Option<FontVec> {
    let font_paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Helvetica.ttc",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    font_paths
        .iter()
        .filter_map(|path| std::fs::read(path).ok())
        .find_map(|data| FontVec::try_from_vec(data).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_current_and_inner_box() {
        let page = RgbImage::from_pixel(100, 80, Rgb([255, 255, 255]));
        let boxes = [Rect::new(5, 5, 40, 30), Rect::new(50, 5, 40, 30)];
        let out = draw_boxes(&page, &boxes, Some(1), Some(Rect::new(2, 2, 10, 8)), None);

        assert_eq!(out.get_pixel(5, 20), &NORMAL);
        assert_eq!(out.get_pixel(50, 20), &CURRENT);
        assert_eq!(out.get_pixel(51, 20), &CURRENT);
        assert_eq!(out.get_pixel(52, 10), &INNER);
        assert_eq!(page.get_pixel(5, 20), &Rgb([255, 255, 255]));
    }
}
