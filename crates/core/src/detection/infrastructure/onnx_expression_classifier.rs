//! FER+ expression classifier: 64×64 grayscale face, eight emotion logits.

use std::path::Path;

use crate::detection::domain::expression::{Expression, ExpressionScores};
use crate::detection::domain::expression_classifier::ExpressionClassifier;
use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

use super::execution_provider::{input_hw, load_session};
use super::math::softmax;
use super::preprocess::{region_to_gray_tensor, square_region, Normalization};

const DEFAULT_INPUT_SIZE: u32 = 64;
const CROP_MARGIN: f64 = 0.05;

/// Model output order. Contempt has no counterpart and is dropped.
const CLASS_ORDER: [Option<Expression>; 8] = [
    Some(Expression::Neutral),
    Some(Expression::Happy),
    Some(Expression::Surprised),
    Some(Expression::Sad),
    Some(Expression::Angry),
    Some(Expression::Disgusted),
    Some(Expression::Fearful),
    None,
];

pub struct OnnxExpressionClassifier {
    session: ort::session::Session,
    input_hw: (u32, u32),
}

impl OnnxExpressionClassifier {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;
        let input_hw = input_hw(&session, (DEFAULT_INPUT_SIZE, DEFAULT_INPUT_SIZE));
        Ok(Self { session, input_hw })
    }
}

impl ExpressionClassifier for OnnxExpressionClassifier {
    fn classify(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<ExpressionScores, Box<dyn std::error::Error>> {
        let crop = square_region(face, CROP_MARGIN);
        let tensor = region_to_gray_tensor(frame, &crop, self.input_hw, Normalization::RAW);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let logits: Vec<f32> = outputs[0].try_extract_array::<f32>()?.iter().copied().collect();
        scores_from_logits(&logits)
    }
}

/// Softmax over the seven mapped classes.
fn scores_from_logits(logits: &[f32]) -> Result<ExpressionScores, Box<dyn std::error::Error>> {
    if logits.len() < 7 {
        return Err(format!("Expression model produced {} logits", logits.len()).into());
    }
    let mapped: Vec<(Expression, f32)> = CLASS_ORDER
        .iter()
        .zip(logits)
        .filter_map(|(class, &logit)| class.map(|e| (e, logit)))
        .collect();
    let probs = softmax(&mapped.iter().map(|(_, l)| *l).collect::<Vec<_>>());

    let mut scores = ExpressionScores::default();
    for ((expression, _), p) in mapped.iter().zip(probs) {
        scores.set(*expression, p as f64);
    }
    Ok(scores)
}
