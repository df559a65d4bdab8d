use serde::{Deserialize, Serialize};

/// A 2D point in pixel coordinates of whatever surface it belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy)
    }
}

/// Axis-aligned box with a top-left origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// `[x1, y1, x2, y2]`
    pub fn to_corners(&self) -> [f64; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    /// Grow the box by `margin` (fraction of each side) around its center.
    pub fn expand(&self, margin: f64) -> Self {
        let dx = self.width * margin;
        let dy = self.height * margin;
        Self::new(
            self.x - dx,
            self.y - dy,
            self.width + dx * 2.0,
            self.height + dy * 2.0,
        )
    }

    /// Clamp to `[0, width) x [0, height)` and round to whole pixels.
    ///
    /// Returns `None` when nothing of the box lies inside the bounds.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let [x1, y1, x2, y2] = self.to_corners();
        let x1 = x1.max(0.0).floor() as i64;
        let y1 = y1.max(0.0).floor() as i64;
        let x2 = (x2.min(width as f64)).ceil() as i64;
        let y2 = (y2.min(height as f64)).ceil() as i64;
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some((x1 as u32, y1 as u32, (x2 - x1) as u32, (y2 - y1) as u32))
    }
}

/// Pixel dimensions of a display surface (canvas, media element, frame).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Largest size with this aspect ratio that fits inside `bounds`.
    pub fn fit_within(&self, bounds: DisplaySize) -> DisplaySize {
        if self.is_empty() || bounds.is_empty() {
            return DisplaySize::default();
        }
        let scale = (bounds.width as f64 / self.width as f64)
            .min(bounds.height as f64 / self.height as f64);
        DisplaySize::new(
            ((self.width as f64 * scale).round() as u32).max(1),
            ((self.height as f64 * scale).round() as u32).max(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_corners_roundtrip() {
        let b = BoundingBox::from_corners(10.0, 20.0, 50.0, 80.0);
        assert_eq!(b, BoundingBox::new(10.0, 20.0, 40.0, 60.0));
        assert_eq!(b.to_corners(), [10.0, 20.0, 50.0, 80.0]);
    }

    #[test]
    fn test_scale_applies_per_axis() {
        let b = BoundingBox::new(10.0, 20.0, 30.0, 40.0).scale(2.0, 0.5);
        assert_relative_eq!(b.x, 20.0);
        assert_relative_eq!(b.y, 10.0);
        assert_relative_eq!(b.width, 60.0);
        assert_relative_eq!(b.height, 20.0);
    }

    #[test]
    fn test_expand_keeps_center() {
        let b = BoundingBox::new(100.0, 100.0, 50.0, 50.0).expand(0.1);
        assert_relative_eq!(b.x + b.width / 2.0, 125.0);
        assert_relative_eq!(b.width, 60.0);
    }

    #[test]
    fn test_area_ignores_negative_extent() {
        assert_eq!(BoundingBox::new(0.0, 0.0, -5.0, 10.0).area(), 0.0);
        assert_relative_eq!(BoundingBox::new(0.0, 0.0, 4.0, 5.0).area(), 20.0);
    }

    #[rstest]
    #[case(BoundingBox::new(-10.0, -10.0, 30.0, 30.0), Some((0, 0, 20, 20)))]
    #[case(BoundingBox::new(90.0, 40.0, 30.0, 30.0), Some((90, 40, 10, 10)))]
    #[case(BoundingBox::new(200.0, 200.0, 10.0, 10.0), None)]
    fn test_clamp_to(#[case] b: BoundingBox, #[case] expected: Option<(u32, u32, u32, u32)>) {
        assert_eq!(b.clamp_to(100, 50), expected);
    }

    #[rstest]
    #[case(DisplaySize::new(0, 10), true)]
    #[case(DisplaySize::new(10, 0), true)]
    #[case(DisplaySize::new(1, 1), false)]
    fn test_display_size_is_empty(#[case] size: DisplaySize, #[case] expected: bool) {
        assert_eq!(size.is_empty(), expected);
    }

    #[test]
    fn test_fit_within_preserves_aspect() {
        let fitted = DisplaySize::new(1280, 720).fit_within(DisplaySize::new(640, 640));
        assert_eq!(fitted, DisplaySize::new(640, 360));
    }

    #[test]
    fn test_point_scale() {
        assert_eq!(Point::new(2.0, 4.0).scale(0.5, 2.0), Point::new(1.0, 8.0));
    }
}
