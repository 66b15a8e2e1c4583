//! Contour helpers shared by box location and watermark suppression.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use crate::core::geometry::Rect;

/// Outermost borders of the foreground (non-zero) regions of a binary mask.
/// Borders nested inside another region's hole are not returned.
///
/// The mask is traced inside a one-pixel zero frame, so regions touching the
/// image edge are still outer borders rather than holes of the background.
pub fn external_contours(mask: &GrayImage) -> Vec<Contour<i32>> {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    for (x, y, pixel) in mask.enumerate_pixels() {
        padded.put_pixel(x + 1, y + 1, *pixel);
    }

    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .map(|mut contour| {
            for p in &mut contour.points {
                p.x -= 1;
                p.y -= 1;
            }
            contour
        })
        .collect()
}

/// Area enclosed by the contour polygon (shoelace formula).
pub fn contour_area(contour: &Contour<i32>) -> f64 {
    let points = &contour.points;
    if points.len() < 3 {
        return 0.0;
    }

    let n = points.len();
    let twice_area: i64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
        })
        .sum();
    twice_area.abs() as f64 / 2.0
}

pub fn bounding_rect(contour: &Contour<i32>) -> Option<Rect> {
    Rect::bounding(
        contour
            .points
            .iter()
            .map(|p| (p.x.max(0) as u32, p.y.max(0) as u32)),
    )
}

/// Paint the contour and everything it encloses into `mask`.
pub fn fill_contour(mask: &mut GrayImage, contour: &Contour<i32>, value: u8) {
    let mut polygon: Vec<Point<i32>> = contour.points.clone();
    polygon.dedup();
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    if polygon.len() >= 3 {
        draw_polygon_mut(mask, &polygon, Luma([value]));
    }
    for p in &contour.points {
        if p.x >= 0 && p.y >= 0 && (p.x as u32) < mask.width() && (p.y as u32) < mask.height() {
            mask.put_pixel(p.x as u32, p.y as u32, Luma([value]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
    use imageproc::rect::Rect as DrawRect;
    use pretty_assertions::assert_eq;

    #[test]
    fn nested_regions_are_not_external() {
        let mut mask = GrayImage::new(60, 60);
        draw_hollow_rect_mut(&mut mask, DrawRect::at(5, 5).of_size(50, 50), Luma([255]));
        draw_filled_rect_mut(&mut mask, DrawRect::at(20, 20).of_size(10, 10), Luma([255]));

        let contours = external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(bounding_rect(&contours[0]), Some(Rect::new(5, 5, 50, 50)));
    }

    #[test]
    fn regions_touching_the_edge_are_external() {
        let mut mask = GrayImage::new(50, 40);
        draw_hollow_rect_mut(&mut mask, DrawRect::at(0, 0).of_size(50, 40), Luma([255]));
        draw_filled_rect_mut(&mut mask, DrawRect::at(10, 10).of_size(8, 8), Luma([255]));

        let contours = external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(bounding_rect(&contours[0]), Some(Rect::new(0, 0, 50, 40)));
    }

    #[test]
    fn area_of_filled_square() {
        let mut mask = GrayImage::new(30, 30);
        draw_filled_rect_mut(&mut mask, DrawRect::at(10, 10).of_size(11, 11), Luma([255]));

        let contours = external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contour_area(&contours[0]), 100.0);
    }

    #[test]
    fn fill_covers_the_interior_of_a_ring() {
        let mut ring = GrayImage::new(40, 40);
        draw_hollow_rect_mut(&mut ring, DrawRect::at(4, 4).of_size(30, 30), Luma([255]));
        let contours = external_contours(&ring);

        let mut mask = GrayImage::new(40, 40);
        fill_contour(&mut mask, &contours[0], 255);
        assert_eq!(mask.get_pixel(18, 18)[0], 255);
        assert_eq!(mask.get_pixel(4, 4)[0], 255);
        assert_eq!(mask.get_pixel(1, 1)[0], 0);
    }
}
