use crate::shared::geometry::{BoundingBox, DisplaySize, Point};

use super::expression::ExpressionScores;
use super::gender::Gender;

/// Raw analysis output for one face, in the coordinates of the surface it
/// was computed on.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionRecord {
    pub bbox: BoundingBox,
    /// Detector confidence for the box.
    pub score: f64,
    pub landmarks: Vec<Point>,
    pub expressions: ExpressionScores,
    pub age: f64,
    pub gender: Gender,
    pub gender_probability: f64,
}

impl DetectionRecord {
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self {
            bbox: self.bbox.scale(sx, sy),
            landmarks: self.landmarks.iter().map(|p| p.scale(sx, sy)).collect(),
            ..self.clone()
        }
    }
}

/// Re-express records computed on a `source`-sized frame in the pixel space
/// of a `target`-sized display surface.
///
/// Either size being empty leaves the records untouched.
pub fn resize_results(
    records: Vec<DetectionRecord>,
    source: DisplaySize,
    target: DisplaySize,
) -> Vec<DetectionRecord> {
    if source.is_empty() || target.is_empty() || source == target {
        return records;
    }
    let sx = target.width as f64 / source.width as f64;
    let sy = target.height as f64 / source.height as f64;
    records.iter().map(|r| r.scaled(sx, sy)).collect()
}
