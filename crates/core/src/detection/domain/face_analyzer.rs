use crate::shared::frame::Frame;

use super::detection_record::DetectionRecord;

/// Full per-frame analysis: every face with landmarks, expressions,
/// age and gender.
///
/// This is the single seam between the detection loop and the inference
/// backend, so loops and use cases can be driven by stubs in tests.
pub trait FaceAnalyzer: Send {
    fn analyze(&mut self, frame: &Frame) -> Result<Vec<DetectionRecord>, Box<dyn std::error::Error>>;
}
