use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

use super::gender::AgeGender;

pub trait AgeGenderEstimator: Send {
    fn estimate(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<AgeGender, Box<dyn std::error::Error>>;
}
