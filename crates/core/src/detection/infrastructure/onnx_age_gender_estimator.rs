//! InsightFace-style `genderage` model: 96×96 RGB face crop in, and
//! `[female, male, age / 100]` out.

use std::path::Path;

use crate::detection::domain::age_gender_estimator::AgeGenderEstimator;
use crate::detection::domain::gender::{AgeGender, Gender};
use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

use super::execution_provider::{input_hw, load_session};
use super::math::softmax;
use super::preprocess::{region_to_rgb_tensor, square_region, Normalization};

const DEFAULT_INPUT_SIZE: u32 = 96;

/// The model was trained on crops 1.5× the face box.
const CROP_MARGIN: f64 = 0.25;

pub struct OnnxAgeGenderEstimator {
    session: ort::session::Session,
    input_hw: (u32, u32),
}

impl OnnxAgeGenderEstimator {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;
        let input_hw = input_hw(&session, (DEFAULT_INPUT_SIZE, DEFAULT_INPUT_SIZE));
        Ok(Self { session, input_hw })
    }
}

impl AgeGenderEstimator for OnnxAgeGenderEstimator {
    fn estimate(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<AgeGender, Box<dyn std::error::Error>> {
        let crop = square_region(face, CROP_MARGIN);
        let tensor = region_to_rgb_tensor(frame, &crop, self.input_hw, Normalization::RAW);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let values: Vec<f32> = outputs[0].try_extract_array::<f32>()?.iter().copied().collect();
        decode_age_gender(&values)
    }
}

fn decode_age_gender(values: &[f32]) -> Result<AgeGender, Box<dyn std::error::Error>> {
    if values.len() < 3 {
        return Err(format!("Age/gender model produced {} values", values.len()).into());
    }
    let probs = softmax(&values[..2]);
    let (gender, probability) = if probs[1] >= probs[0] {
        (Gender::Male, probs[1])
    } else {
        (Gender::Female, probs[0])
    };
    Ok(AgeGender {
        age: (values[2] as f64 * 100.0).max(0.0),
        gender,
        gender_probability: probability as f64,
    })
}
