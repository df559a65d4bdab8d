use ndarray::ArrayView3;

use super::geometry::{BoundingBox, DisplaySize};

/// A captured or decoded picture: contiguous RGB bytes in row-major order.
///
/// Pixel format conversion happens where frames enter or leave the crate;
/// everything in between reads `Frame` as plain interleaved RGB.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn from_rgb_image(img: image::RgbImage, index: usize) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height, 3, index)
    }

    /// Copies the frame into an `image` buffer; `None` for non-RGB frames.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        if self.channels != 3 {
            return None;
        }
        image::RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> DisplaySize {
        DisplaySize::new(self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the part of the frame covered by `region`, clamped to the frame.
    pub fn crop(&self, region: &BoundingBox) -> Option<Frame> {
        let (x, y, w, h) = region.clamp_to(self.width, self.height)?;
        let c = self.channels as usize;
        let stride = self.width as usize * c;
        let mut data = Vec::with_capacity(w as usize * h as usize * c);
        for row in y as usize..(y + h) as usize {
            let start = row * stride + x as usize * c;
            data.extend_from_slice(&self.data[start..start + w as usize * c]);
        }
        Some(Frame::new(data, w, h, self.channels, self.index))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Frame {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 0]);
            }
        }
        Frame::new(data, width, height, 3, 0)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12];
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.size(), DisplaySize::new(2, 2));
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 3, 0);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        let frame = gradient(4, 3);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[3, 4, 3]);
        assert_eq!(arr[[2, 1, 0]], 1);
        assert_eq!(arr[[2, 1, 1]], 2);
    }

    #[test]
    fn test_crop_copies_region() {
        let frame = gradient(10, 10);
        let crop = frame.crop(&BoundingBox::new(2.0, 3.0, 4.0, 2.0)).unwrap();
        assert_eq!((crop.width(), crop.height()), (4, 2));
        assert_eq!(&crop.data()[0..3], &[2, 3, 0]);
        let arr = crop.as_ndarray();
        assert_eq!(arr[[1, 3, 0]], 5);
        assert_eq!(arr[[1, 3, 1]], 4);
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let frame = gradient(10, 10);
        let crop = frame.crop(&BoundingBox::new(-5.0, 8.0, 10.0, 10.0)).unwrap();
        assert_eq!((crop.width(), crop.height()), (5, 2));
    }

    #[test]
    fn test_crop_outside_returns_none() {
        let frame = gradient(10, 10);
        assert!(frame.crop(&BoundingBox::new(20.0, 20.0, 5.0, 5.0)).is_none());
    }

    #[test]
    fn test_rgb_image_conversion() {
        let mut img = image::RgbImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgb([9, 8, 7]));
        let frame = Frame::from_rgb_image(img, 4);
        assert_eq!(frame.index(), 4);
        let back = frame.to_rgb_image().unwrap();
        assert_eq!(back.get_pixel(2, 1).0, [9, 8, 7]);
    }
}
