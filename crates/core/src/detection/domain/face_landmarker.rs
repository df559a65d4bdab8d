use crate::shared::frame::Frame;
use crate::shared::geometry::{BoundingBox, Point};

/// Number of points in the standard 68-point face layout
/// (jaw 0-16, brows 17-26, nose 27-35, eyes 36-47, mouth 48-67).
pub const LANDMARK_COUNT: usize = 68;

/// Places facial landmarks inside a detected face box.
pub trait FaceLandmarker: Send {
    /// Returns landmark positions in frame pixel coordinates.
    fn landmarks(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<Vec<Point>, Box<dyn std::error::Error>>;
}
