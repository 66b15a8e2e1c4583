use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle, origin top-left.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle covering every point, inclusive of the extreme pixels.
    pub fn bounding<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let (mut x0, mut y0, mut x1, mut y1) = (x, y, x, y);
        for (x, y) in iter {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        Some(Self::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1))
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersect with an image of the given size.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Self {
            x,
            y,
            width: self.right().min(width) - x,
            height: self.bottom().min(height) - y,
        }
    }

    /// Translate a rectangle expressed relative to `self` into the parent frame.
    pub fn offset_child(&self, child: &Rect) -> Self {
        Self::new(self.x + child.x, self.y + child.y, child.width, child.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bounding_rect_is_inclusive() {
        let rect = Rect::bounding([(2, 3), (5, 3), (5, 9), (2, 9)]).unwrap();
        assert_eq!(rect, Rect::new(2, 3, 4, 7));
    }

    #[test]
    fn bounding_of_nothing_is_none() {
        assert!(Rect::bounding(std::iter::empty()).is_none());
    }

    #[test]
    fn clamps_to_image_bounds() {
        let rect = Rect::new(90, 40, 50, 50).clamp_to(100, 60);
        assert_eq!(rect, Rect::new(90, 40, 10, 20));

        let outside = Rect::new(120, 10, 5, 5).clamp_to(100, 60);
        assert!(outside.is_empty());
    }
}
