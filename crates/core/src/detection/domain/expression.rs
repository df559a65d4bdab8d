use serde::{Deserialize, Serialize};

/// Facial expressions reported for each face, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
}

impl Expression {
    pub const ALL: [Expression; 7] = [
        Expression::Neutral,
        Expression::Happy,
        Expression::Sad,
        Expression::Angry,
        Expression::Fearful,
        Expression::Disgusted,
        Expression::Surprised,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Expression::Neutral => "neutral",
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Angry => "angry",
            Expression::Fearful => "fearful",
            Expression::Disgusted => "disgusted",
            Expression::Surprised => "surprised",
        }
    }

    /// Name with the first letter upper-cased, as shown on face cards.
    pub fn label(self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-expression probabilities. Absent entries were not reported.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutral: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub happy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sad: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angry: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fearful: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disgusted: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surprised: Option<f64>,
}

impl ExpressionScores {
    pub fn get(&self, expression: Expression) -> Option<f64> {
        match expression {
            Expression::Neutral => self.neutral,
            Expression::Happy => self.happy,
            Expression::Sad => self.sad,
            Expression::Angry => self.angry,
            Expression::Fearful => self.fearful,
            Expression::Disgusted => self.disgusted,
            Expression::Surprised => self.surprised,
        }
    }

    pub fn set(&mut self, expression: Expression, score: f64) {
        let slot = match expression {
            Expression::Neutral => &mut self.neutral,
            Expression::Happy => &mut self.happy,
            Expression::Sad => &mut self.sad,
            Expression::Angry => &mut self.angry,
            Expression::Fearful => &mut self.fearful,
            Expression::Disgusted => &mut self.disgusted,
            Expression::Surprised => &mut self.surprised,
        };
        *slot = Some(score);
    }

    /// Reported scores in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Expression, f64)> + '_ {
        Expression::ALL
            .iter()
            .filter_map(|&e| self.get(e).map(|score| (e, score)))
    }

    /// Most likely expression.
    ///
    /// Starts from neutral (score 0 when absent); another expression wins
    /// only with a strictly greater score, so ties keep the earlier entry.
    pub fn top(&self) -> Expression {
        let mut best = Expression::Neutral;
        let mut best_score = self.neutral.unwrap_or(0.0);
        for (expression, score) in self.iter() {
            if score > best_score {
                best = expression;
                best_score = score;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn scores(pairs: &[(Expression, f64)]) -> ExpressionScores {
        let mut s = ExpressionScores::default();
        for &(e, v) in pairs {
            s.set(e, v);
        }
        s
    }

    #[test]
    fn test_empty_scores_default_to_neutral() {
        assert_eq!(ExpressionScores::default().top(), Expression::Neutral);
    }

    #[test]
    fn test_highest_score_wins() {
        let s = scores(&[
            (Expression::Neutral, 0.1),
            (Expression::Happy, 0.7),
            (Expression::Sad, 0.2),
        ]);
        assert_eq!(s.top(), Expression::Happy);
    }

    #[test]
    fn test_tie_keeps_earlier_expression() {
        let s = scores(&[
            (Expression::Neutral, 0.4),
            (Expression::Happy, 0.4),
            (Expression::Angry, 0.2),
        ]);
        assert_eq!(s.top(), Expression::Neutral);

        let s = scores(&[(Expression::Sad, 0.5), (Expression::Surprised, 0.5)]);
        assert_eq!(s.top(), Expression::Sad);
    }

    #[test]
    fn test_zero_scores_never_beat_missing_neutral() {
        let s = scores(&[(Expression::Happy, 0.0)]);
        assert_eq!(s.top(), Expression::Neutral);
    }

    #[rstest]
    #[case(Expression::Happy, "Happy")]
    #[case(Expression::Disgusted, "Disgusted")]
    #[case(Expression::Neutral, "Neutral")]
    fn test_label_capitalizes(#[case] e: Expression, #[case] expected: &str) {
        assert_eq!(e.label(), expected);
    }

    #[test]
    fn test_iter_follows_display_order() {
        let s = scores(&[(Expression::Surprised, 0.3), (Expression::Neutral, 0.6)]);
        let order: Vec<_> = s.iter().map(|(e, _)| e).collect();
        assert_eq!(order, vec![Expression::Neutral, Expression::Surprised]);
    }

    #[test]
    fn test_serializes_only_reported_scores() {
        let s = scores(&[(Expression::Happy, 0.5)]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"happy":0.5}"#);
    }
}
