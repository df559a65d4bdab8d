use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

use super::expression::ExpressionScores;

pub trait ExpressionClassifier: Send {
    fn classify(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<ExpressionScores, Box<dyn std::error::Error>>;
}
