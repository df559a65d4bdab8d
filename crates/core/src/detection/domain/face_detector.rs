use crate::shared::frame::Frame;
use crate::shared::geometry::{BoundingBox, Point};

/// A face located in a frame, in frame pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceBox {
    pub bbox: BoundingBox,
    pub score: f64,
    /// Coarse keypoints (eyes, nose, mouth corners) when the detector emits
    /// them; only confidently visible points are kept.
    pub keypoints: Vec<Point>,
}

/// Locates faces in a single frame.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>>;
}
