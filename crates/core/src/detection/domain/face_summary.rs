use super::detected_face::DetectedFace;

const UNKNOWN: &str = "Unknown";

/// Text shown on a face card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceSummary {
    pub title: String,
    pub confidence: String,
    pub age: String,
    pub gender: String,
    pub expression: String,
}

impl FaceSummary {
    /// `index` is the face's zero-based position in the current pass.
    pub fn new(face: &DetectedFace, index: usize) -> Self {
        let confidence = (face.probability.unwrap_or(0.0) * 100.0).round() as i64;
        let age = face
            .age
            .map(|a| format!("~{}", a.round() as i64))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let gender = face
            .gender
            .as_deref()
            .filter(|g| !g.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string();
        let expression = face
            .expressions
            .as_ref()
            .map(|e| e.top().label())
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            title: format!("Face #{}", index + 1),
            confidence: format!("{confidence}% confidence"),
            age,
            gender,
            expression,
        }
    }

    pub fn for_faces(faces: &[DetectedFace]) -> Vec<FaceSummary> {
        faces
            .iter()
            .enumerate()
            .map(|(i, f)| FaceSummary::new(f, i))
            .collect()
    }
}

impl std::fmt::Display for FaceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): age {}, gender {}, expression {}",
            self.title, self.confidence, self.age, self.gender, self.expression
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::expression::{Expression, ExpressionScores};
    use crate::shared::geometry::BoundingBox;
    use rstest::rstest;
    use uuid::Uuid;

    fn bare_face() -> DetectedFace {
        DetectedFace {
            id: Uuid::new_v4(),
            bounding_box: BoundingBox::default(),
            landmarks: None,
            expressions: None,
            gender: None,
            age: None,
            probability: None,
        }
    }

    #[test]
    fn test_missing_fields_show_unknown() {
        let s = FaceSummary::new(&bare_face(), 0);
        assert_eq!(s.title, "Face #1");
        assert_eq!(s.confidence, "0% confidence");
        assert_eq!(s.age, "Unknown");
        assert_eq!(s.gender, "Unknown");
        assert_eq!(s.expression, "Unknown");
    }

    #[rstest]
    #[case(0.874, "87% confidence")]
    #[case(0.875, "88% confidence")]
    #[case(1.0, "100% confidence")]
    fn test_confidence_rounds_percent(#[case] p: f64, #[case] expected: &str) {
        let face = DetectedFace {
            probability: Some(p),
            ..bare_face()
        };
        assert_eq!(FaceSummary::new(&face, 0).confidence, expected);
    }

    #[rstest]
    #[case(29.4, "~29")]
    #[case(29.5, "~30")]
    #[case(0.2, "~0")]
    fn test_age_rounds(#[case] age: f64, #[case] expected: &str) {
        let face = DetectedFace {
            age: Some(age),
            ..bare_face()
        };
        assert_eq!(FaceSummary::new(&face, 0).age, expected);
    }

    #[test]
    fn test_empty_gender_is_unknown() {
        let face = DetectedFace {
            gender: Some(String::new()),
            ..bare_face()
        };
        assert_eq!(FaceSummary::new(&face, 0).gender, "Unknown");
    }

    #[test]
    fn test_expression_uses_top_label() {
        let mut scores = ExpressionScores::default();
        scores.set(Expression::Neutral, 0.2);
        scores.set(Expression::Surprised, 0.6);
        let face = DetectedFace {
            expressions: Some(scores),
            gender: Some("male".into()),
            ..bare_face()
        };
        let s = FaceSummary::new(&face, 2);
        assert_eq!(s.title, "Face #3");
        assert_eq!(s.expression, "Surprised");
        assert_eq!(s.gender, "male");
    }

    #[test]
    fn test_empty_expression_map_is_neutral() {
        let face = DetectedFace {
            expressions: Some(ExpressionScores::default()),
            ..bare_face()
        };
        assert_eq!(FaceSummary::new(&face, 0).expression, "Neutral");
    }

    #[test]
    fn test_for_faces_numbers_sequentially() {
        let titles: Vec<_> = FaceSummary::for_faces(&[bare_face(), bare_face()])
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["Face #1", "Face #2"]);
    }
}
