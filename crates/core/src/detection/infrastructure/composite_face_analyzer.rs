use std::path::Path;

use crate::detection::domain::age_gender_estimator::AgeGenderEstimator;
use crate::detection::domain::detection_record::DetectionRecord;
use crate::detection::domain::expression_classifier::ExpressionClassifier;
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_landmarker::FaceLandmarker;
use crate::shared::frame::Frame;

use super::model_loader::ModelPaths;
use super::onnx_age_gender_estimator::OnnxAgeGenderEstimator;
use super::onnx_expression_classifier::OnnxExpressionClassifier;
use super::onnx_face_detector::OnnxFaceDetector;
use super::onnx_face_landmarker::OnnxFaceLandmarker;

/// Detector followed by per-face attribute models.
///
/// Without a landmarker, the detector's own keypoints are reported.
pub struct CompositeFaceAnalyzer {
    detector: Box<dyn FaceDetector>,
    landmarker: Option<Box<dyn FaceLandmarker>>,
    expressions: Box<dyn ExpressionClassifier>,
    age_gender: Box<dyn AgeGenderEstimator>,
}

impl CompositeFaceAnalyzer {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        landmarker: Option<Box<dyn FaceLandmarker>>,
        expressions: Box<dyn ExpressionClassifier>,
        age_gender: Box<dyn AgeGenderEstimator>,
    ) -> Self {
        Self {
            detector,
            landmarker,
            expressions,
            age_gender,
        }
    }

    /// Build the ONNX-backed analyzer from resolved model files.
    pub fn from_models(
        paths: &ModelPaths,
        confidence: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let detector = OnnxFaceDetector::new(&paths.detector, confidence)?;
        let landmarker = paths.landmarks.as_deref().and_then(load_optional_landmarker);
        let expressions = OnnxExpressionClassifier::new(&paths.expressions)?;
        let age_gender = OnnxAgeGenderEstimator::new(&paths.age_gender)?;
        Ok(Self::new(
            Box::new(detector),
            landmarker,
            Box::new(expressions),
            Box::new(age_gender),
        ))
    }
}

fn load_optional_landmarker(path: &Path) -> Option<Box<dyn FaceLandmarker>> {
    match OnnxFaceLandmarker::new(path) {
        Ok(l) => Some(Box::new(l)),
        Err(e) => {
            log::warn!("Landmark model unavailable, using detector keypoints: {e}");
            None
        }
    }
}

impl FaceAnalyzer for CompositeFaceAnalyzer {
    fn analyze(&mut self, frame: &Frame) -> Result<Vec<DetectionRecord>, Box<dyn std::error::Error>> {
        let faces = self.detector.detect(frame)?;
        let mut records = Vec::with_capacity(faces.len());

        for face in faces {
            let landmarks = match self.landmarker.as_mut() {
                Some(l) => l.landmarks(frame, &face.bbox)?,
                None => face.keypoints.clone(),
            };
            let expressions = self.expressions.classify(frame, &face.bbox)?;
            let age_gender = self.age_gender.estimate(frame, &face.bbox)?;

            records.push(DetectionRecord {
                bbox: face.bbox,
                score: face.score,
                landmarks,
                expressions,
                age: age_gender.age,
                gender: age_gender.gender,
                gender_probability: age_gender.gender_probability,
            });
        }

        log::debug!("Analyzed frame {}: {} face(s)", frame.index(), records.len());
        Ok(records)
    }
}
