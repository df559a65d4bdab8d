use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::geometry::{BoundingBox, Point};

use super::detection_record::DetectionRecord;
use super::expression::ExpressionScores;

/// Per-face record kept in the store and rendered by cards and overlays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFace {
    pub id: Uuid,
    pub bounding_box: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expressions: Option<ExpressionScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    /// Confidence shown on the card. Carries the gender probability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

impl From<&DetectionRecord> for DetectedFace {
    fn from(record: &DetectionRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            bounding_box: record.bbox,
            landmarks: Some(record.landmarks.clone()),
            expressions: Some(record.expressions.clone()),
            gender: Some(record.gender.to_string()),
            age: Some(record.age),
            probability: Some(record.gender_probability),
        }
    }
}

/// Convert one analysis pass into display records; every face gets a fresh id.
pub fn map_records(records: &[DetectionRecord]) -> Vec<DetectedFace> {
    records.iter().map(DetectedFace::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detection_record::tests::record;
    use crate::detection::domain::expression::Expression;

    #[test]
    fn test_map_copies_fields() {
        let mut r = record(10.0, 20.0, 30.0, 40.0);
        r.expressions.set(Expression::Happy, 0.9);
        r.landmarks = vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)];

        let faces = map_records(&[r.clone()]);
        assert_eq!(faces.len(), 1);
        let f = &faces[0];
        assert_eq!(f.bounding_box, r.bbox);
        assert_eq!(f.landmarks.as_deref(), Some(&r.landmarks[..]));
        assert_eq!(f.expressions.as_ref().and_then(|e| e.happy), Some(0.9));
        assert_eq!(f.gender.as_deref(), Some("female"));
        assert_eq!(f.age, Some(30.0));
        assert_eq!(f.probability, Some(0.8));
    }

    #[test]
    fn test_map_assigns_unique_ids() {
        let r = record(0.0, 0.0, 1.0, 1.0);
        let faces = map_records(&[r.clone(), r.clone()]);
        assert_ne!(faces[0].id, faces[1].id);
        let again = map_records(&[r]);
        assert_ne!(faces[0].id, again[0].id);
    }

    #[test]
    fn test_map_preserves_order_and_empty_input() {
        assert!(map_records(&[]).is_empty());
        let faces = map_records(&[record(1.0, 0.0, 1.0, 1.0), record(2.0, 0.0, 1.0, 1.0)]);
        assert_eq!(faces[0].bounding_box.x, 1.0);
        assert_eq!(faces[1].bounding_box.x, 2.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let face = map_records(&[record(1.0, 2.0, 3.0, 4.0)]).remove(0);
        let json = serde_json::to_value(&face).unwrap();
        assert!(json.get("boundingBox").is_some());
        assert_eq!(json["boundingBox"]["width"], 3.0);
        assert_eq!(json["gender"], "female");
        assert!(json.get("bounding_box").is_none());
    }
}
