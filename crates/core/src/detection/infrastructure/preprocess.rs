//! Crop-and-resize helpers that turn a face region into a model input tensor.

use ndarray::Array4;

use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

/// How 8-bit samples map to float model inputs: `(v - mean) / std`.
#[derive(Clone, Copy, Debug)]
pub struct Normalization {
    pub mean: f32,
    pub std: f32,
}

impl Normalization {
    /// `[0, 255]` → `[0, 1]`
    pub const UNIT: Normalization = Normalization {
        mean: 0.0,
        std: 255.0,
    };
    /// Raw pixel values.
    pub const RAW: Normalization = Normalization {
        mean: 0.0,
        std: 1.0,
    };
}

/// Sample `region` of `frame` into a `[1, 3, h, w]` RGB tensor.
///
/// Nearest-neighbor sampling at pixel centers; parts of the region outside
/// the frame are clamped to the nearest edge pixel.
pub fn region_to_rgb_tensor(
    frame: &Frame,
    region: &BoundingBox,
    (h, w): (u32, u32),
    norm: Normalization,
) -> Array4<f32> {
    let mut tensor = Array4::<f32>::zeros((1, 3, h as usize, w as usize));
    sample_region(frame, region, (h, w), |y, x, rgb| {
        for c in 0..3 {
            tensor[[0, c, y, x]] = (rgb[c] as f32 - norm.mean) / norm.std;
        }
    });
    tensor
}

/// Sample `region` of `frame` into a `[1, 1, h, w]` luma tensor (BT.601).
pub fn region_to_gray_tensor(
    frame: &Frame,
    region: &BoundingBox,
    (h, w): (u32, u32),
    norm: Normalization,
) -> Array4<f32> {
    let mut tensor = Array4::<f32>::zeros((1, 1, h as usize, w as usize));
    sample_region(frame, region, (h, w), |y, x, rgb| {
        let luma = 0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32;
        tensor[[0, 0, y, x]] = (luma - norm.mean) / norm.std;
    });
    tensor
}

fn sample_region(
    frame: &Frame,
    region: &BoundingBox,
    (h, w): (u32, u32),
    mut put: impl FnMut(usize, usize, [u8; 3]),
) {
    let fw = frame.width() as usize;
    let fh = frame.height() as usize;
    if fw == 0 || fh == 0 || h == 0 || w == 0 {
        return;
    }
    let src = frame.as_ndarray();
    let channels = frame.channels() as usize;
    let sx = region.width / w as f64;
    let sy = region.height / h as f64;

    for y in 0..h as usize {
        let src_y = (region.y + (y as f64 + 0.5) * sy).floor().clamp(0.0, (fh - 1) as f64) as usize;
        for x in 0..w as usize {
            let src_x =
                (region.x + (x as f64 + 0.5) * sx).floor().clamp(0.0, (fw - 1) as f64) as usize;
            let rgb = if channels >= 3 {
                [src[[src_y, src_x, 0]], src[[src_y, src_x, 1]], src[[src_y, src_x, 2]]]
            } else {
                let v = src[[src_y, src_x, 0]];
                [v, v, v]
            };
            put(y, x, rgb);
        }
    }
}

/// Square region centered on `bbox`, grown by `margin` of the longer side.
pub fn square_region(bbox: &BoundingBox, margin: f64) -> BoundingBox {
    let side = bbox.width.max(bbox.height) * (1.0 + margin * 2.0);
    let cx = bbox.x + bbox.width / 2.0;
    let cy = bbox.y + bbox.height / 2.0;
    BoundingBox::new(cx - side / 2.0, cy - side / 2.0, side, side)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn split_frame() -> Frame {
        // Left half red, right half blue, 8x4.
        let mut data = Vec::new();
        for _y in 0..4 {
            for x in 0..8 {
                if x < 4 {
                    data.extend_from_slice(&[255, 0, 0]);
                } else {
                    data.extend_from_slice(&[0, 0, 255]);
                }
            }
        }
        Frame::new(data, 8, 4, 3, 0)
    }

    #[test]
    fn test_rgb_tensor_shape_and_values() {
        let frame = split_frame();
        let t = region_to_rgb_tensor(
            &frame,
            &BoundingBox::new(0.0, 0.0, 8.0, 4.0),
            (2, 2),
            Normalization::UNIT,
        );
        assert_eq!(t.shape(), &[1, 3, 2, 2]);
        assert_relative_eq!(t[[0, 0, 0, 0]], 1.0);
        assert_relative_eq!(t[[0, 2, 0, 0]], 0.0);
        assert_relative_eq!(t[[0, 2, 1, 1]], 1.0);
    }

    #[test]
    fn test_region_selects_sub_area() {
        let frame = split_frame();
        let t = region_to_rgb_tensor(
            &frame,
            &BoundingBox::new(4.0, 0.0, 4.0, 4.0),
            (3, 3),
            Normalization::RAW,
        );
        for y in 0..3 {
            for x in 0..3 {
                assert_relative_eq!(t[[0, 2, y, x]], 255.0);
                assert_relative_eq!(t[[0, 0, y, x]], 0.0);
            }
        }
    }

    #[test]
    fn test_out_of_frame_region_clamps_to_edge() {
        let frame = split_frame();
        let t = region_to_rgb_tensor(
            &frame,
            &BoundingBox::new(-10.0, -10.0, 5.0, 5.0),
            (2, 2),
            Normalization::UNIT,
        );
        assert_relative_eq!(t[[0, 0, 0, 0]], 1.0);
    }

    #[test]
    fn test_gray_tensor_uses_luma() {
        let frame = split_frame();
        let t = region_to_gray_tensor(
            &frame,
            &BoundingBox::new(0.0, 0.0, 4.0, 4.0),
            (1, 1),
            Normalization::RAW,
        );
        assert_eq!(t.shape(), &[1, 1, 1, 1]);
        assert_relative_eq!(t[[0, 0, 0, 0]], 0.299 * 255.0, epsilon = 1e-3);
    }

    #[test]
    fn test_square_region_centers_on_box() {
        let r = square_region(&BoundingBox::new(10.0, 20.0, 40.0, 20.0), 0.1);
        assert_relative_eq!(r.width, 48.0);
        assert_relative_eq!(r.height, 48.0);
        assert_relative_eq!(r.x + r.width / 2.0, 30.0);
        assert_relative_eq!(r.y + r.height / 2.0, 30.0);
    }
}
