use image::imageops::crop_imm;
use image::{GrayImage, RgbImage};

use crate::core::config::ImageParams;
use crate::core::error::ExtractError;
use crate::core::geometry::Rect;
use crate::imaging::contour::{bounding_rect, contour_area, external_contours};
use crate::imaging::preprocess::binarize_page;

/// Binarized page and the record rectangles found on it.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub binary: GrayImage,
    /// Record rectangles in decreasing contour area, not reading order.
    pub records: Vec<Rect>,
}

/// Finds record boxes on a page and the serial-number box inside each record.
#[derive(Debug, Clone)]
pub struct BoxLocator<'a> {
    params: &'a ImageParams,
}

impl<'a> BoxLocator<'a> {
    pub fn new(params: &'a ImageParams) -> Self {
        Self { params }
    }

    pub fn locate(&self, page: &RgbImage) -> Result<PageLayout, ExtractError> {
        let binary = binarize_page(page, self.params)?;
        let records = find_record_boxes(&binary, self.params.max_contours);
        Ok(PageLayout { binary, records })
    }

    /// Inner box of `record`, in coordinates relative to the record.
    pub fn inner_box(&self, layout: &PageLayout, record: Rect) -> Option<Rect> {
        let record = record.clamp_to(layout.binary.width(), layout.binary.height());
        let crop = crop_imm(&layout.binary, record.x, record.y, record.width, record.height).to_image();
        find_inner_box(&crop)
    }
}

/// Bounding rectangles of the `max_contours` largest external contours,
/// largest first.
pub fn find_record_boxes(binary: &GrayImage, max_contours: usize) -> Vec<Rect> {
    let mut contours: Vec<_> = external_contours(binary)
        .into_iter()
        .map(|contour| (contour_area(&contour), contour))
        .collect();
    contours.sort_by(|a, b| b.0.total_cmp(&a.0));

    contours
        .iter()
        .take(max_contours)
        .filter_map(|(_, contour)| bounding_rect(contour))
        .collect()
}

/// Largest external contour in the top-left third of a binary record crop.
///
/// The serial-number box sits in that corner by layout convention. `None`
/// means the record has no recoverable serial number.
pub fn find_inner_box(record: &GrayImage) -> Option<Rect> {
    let (w, h) = (record.width() / 3, record.height() / 3);
    if w == 0 || h == 0 {
        return None;
    }

    let corner = crop_imm(record, 0, 0, w, h).to_image();
    external_contours(&corner)
        .iter()
        .map(|contour| (contour_area(contour), contour))
        .fold(None, |best: Option<(f64, _)>, candidate| match best {
            Some(b) if b.0 >= candidate.0 => Some(b),
            _ => Some(candidate),
        })
        .and_then(|(_, contour)| bounding_rect(contour))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
    use imageproc::rect::Rect as DrawRect;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_largest_boxes_first() {
        let mut page = GrayImage::new(200, 100);
        draw_hollow_rect_mut(&mut page, DrawRect::at(5, 5).of_size(40, 40), Luma([255]));
        draw_hollow_rect_mut(&mut page, DrawRect::at(60, 5).of_size(80, 60), Luma([255]));
        draw_filled_rect_mut(&mut page, DrawRect::at(160, 10).of_size(3, 3), Luma([255]));

        let boxes = find_record_boxes(&page, 2);
        assert_eq!(boxes, vec![Rect::new(60, 5, 80, 60), Rect::new(5, 5, 40, 40)]);
    }

    #[test]
    fn inner_box_is_searched_in_top_left_third_only() {
        let mut record = GrayImage::new(90, 60);
        draw_filled_rect_mut(&mut record, DrawRect::at(4, 3).of_size(20, 12), Luma([255]));
        // Larger blob outside the corner must be ignored.
        draw_filled_rect_mut(&mut record, DrawRect::at(50, 30).of_size(30, 25), Luma([255]));

        assert_eq!(find_inner_box(&record), Some(Rect::new(4, 3, 20, 12)));
    }

    #[test]
    fn boxes_touching_the_page_edge_are_found() {
        // Dark scan shadow along the left edge of the page.
        let mut page = GrayImage::new(200, 100);
        draw_filled_rect_mut(&mut page, DrawRect::at(0, 0).of_size(6, 100), Luma([255]));
        draw_hollow_rect_mut(&mut page, DrawRect::at(60, 30).of_size(40, 40), Luma([255]));

        let boxes = find_record_boxes(&page, 5);
        assert_eq!(boxes, vec![Rect::new(60, 30, 40, 40), Rect::new(0, 0, 6, 100)]);
    }

    #[test]
    fn inner_box_is_found_in_a_framed_record_crop() {
        // A record crop is the bounding box of its own frame.
        let mut record = GrayImage::new(90, 60);
        draw_hollow_rect_mut(&mut record, DrawRect::at(0, 0).of_size(90, 60), Luma([255]));
        draw_hollow_rect_mut(&mut record, DrawRect::at(4, 3).of_size(20, 12), Luma([255]));

        assert_eq!(find_inner_box(&record), Some(Rect::new(4, 3, 20, 12)));
    }

    #[test]
    fn blank_record_has_no_inner_box() {
        assert_eq!(find_inner_box(&GrayImage::new(90, 60)), None);
        assert_eq!(find_inner_box(&GrayImage::new(2, 2)), None);
    }
}
