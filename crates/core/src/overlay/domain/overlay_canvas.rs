use std::sync::{Arc, Mutex};

use crate::shared::geometry::DisplaySize;

/// Canvas shared between the detection thread and whoever displays it.
pub type SharedCanvas = Arc<Mutex<OverlayCanvas>>;

/// Transparent RGBA drawing surface laid over the displayed media.
///
/// Coordinates are display pixels. Writes outside the surface are ignored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl OverlayCanvas {
    pub fn new(size: DisplaySize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            pixels: vec![0; size.width as usize * size.height as usize * 4],
        }
    }

    pub fn size(&self) -> DisplaySize {
        DisplaySize::new(self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize to `size`. A size change drops everything drawn so far.
    pub fn match_dimensions(&mut self, size: DisplaySize) {
        if self.size() != size {
            *self = Self::new(size);
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Paint one opaque pixel. Returns false when `(x, y)` is off the canvas.
    pub fn set_pixel(&mut self, x: i32, y: i32, rgb: [u8; 3]) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return false;
        }
        let i = self.offset(x as u32, y as u32);
        self.pixels[i..i + 4].copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        true
    }

    /// Interleaved RGBA bytes, row-major.
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_is_transparent() {
        let canvas = OverlayCanvas::new(DisplaySize::new(4, 3));
        assert_eq!(canvas.as_rgba().len(), 4 * 3 * 4);
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_set_pixel_clips_to_bounds() {
        let mut canvas = OverlayCanvas::new(DisplaySize::new(4, 3));
        assert!(canvas.set_pixel(3, 2, [1, 2, 3]));
        assert!(!canvas.set_pixel(4, 0, [1, 2, 3]));
        assert!(!canvas.set_pixel(-1, 0, [1, 2, 3]));
        assert_eq!(canvas.pixel(3, 2), Some([1, 2, 3, 255]));
        assert_eq!(canvas.pixel(4, 2), None);
    }

    #[test]
    fn test_match_dimensions_same_size_keeps_contents() {
        let mut canvas = OverlayCanvas::new(DisplaySize::new(4, 3));
        canvas.set_pixel(0, 0, [9, 9, 9]);
        canvas.match_dimensions(DisplaySize::new(4, 3));
        assert!(!canvas.is_blank());
    }

    #[test]
    fn test_match_dimensions_resize_clears() {
        let mut canvas = OverlayCanvas::new(DisplaySize::new(4, 3));
        canvas.set_pixel(0, 0, [9, 9, 9]);
        canvas.match_dimensions(DisplaySize::new(8, 6));
        assert_eq!(canvas.size(), DisplaySize::new(8, 6));
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_clear() {
        let mut canvas = OverlayCanvas::new(DisplaySize::new(2, 2));
        canvas.set_pixel(1, 1, [255, 0, 0]);
        canvas.clear();
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_default_is_empty() {
        let canvas = OverlayCanvas::default();
        assert!(canvas.size().is_empty());
        assert!(canvas.to_rgba_image().is_some());
    }
}
