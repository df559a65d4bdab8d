//! 68-point landmark regressor over a square face crop.

use std::path::Path;

use crate::detection::domain::face_landmarker::{FaceLandmarker, LANDMARK_COUNT};
use crate::shared::frame::Frame;
use crate::shared::geometry::{BoundingBox, Point};

use super::execution_provider::{input_hw, load_session};
use super::preprocess::{region_to_rgb_tensor, square_region, Normalization};

const DEFAULT_INPUT_SIZE: u32 = 112;

/// Crop margin around the detector box, as a fraction of its longer side.
const CROP_MARGIN: f64 = 0.1;

pub struct OnnxFaceLandmarker {
    session: ort::session::Session,
    input_hw: (u32, u32),
}

impl OnnxFaceLandmarker {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;
        let input_hw = input_hw(&session, (DEFAULT_INPUT_SIZE, DEFAULT_INPUT_SIZE));
        Ok(Self { session, input_hw })
    }
}

impl FaceLandmarker for OnnxFaceLandmarker {
    fn landmarks(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<Vec<Point>, Box<dyn std::error::Error>> {
        let crop = square_region(face, CROP_MARGIN);
        let tensor = region_to_rgb_tensor(frame, &crop, self.input_hw, Normalization::UNIT);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let values: Vec<f32> = outputs[0].try_extract_array::<f32>()?.iter().copied().collect();
        decode_landmarks(&values, &crop, self.input_hw)
    }
}

/// Map regressed `(x, y)` pairs back to frame coordinates.
///
/// Models either emit crop-relative values in `[0, 1]` or pixel positions in
/// model input space; the latter are detected by any value beyond 1.5.
fn decode_landmarks(
    values: &[f32],
    crop: &BoundingBox,
    (in_h, in_w): (u32, u32),
) -> Result<Vec<Point>, Box<dyn std::error::Error>> {
    if values.len() < LANDMARK_COUNT * 2 {
        return Err(format!(
            "Landmark model produced {} values, expected {}",
            values.len(),
            LANDMARK_COUNT * 2
        )
        .into());
    }
    let values = &values[..LANDMARK_COUNT * 2];
    let in_pixels = values.iter().any(|v| v.abs() > 1.5);
    let (norm_x, norm_y) = if in_pixels {
        (in_w as f64, in_h as f64)
    } else {
        (1.0, 1.0)
    };

    Ok(values
        .chunks_exact(2)
        .map(|xy| {
            Point::new(
                crop.x + xy[0] as f64 / norm_x * crop.width,
                crop.y + xy[1] as f64 / norm_y * crop.height,
            )
        })
        .collect())
}
