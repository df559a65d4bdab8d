use serde::{Deserialize, Serialize};

/// Which input currently feeds detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionSource {
    Webcam,
    Upload,
}

impl DetectionSource {
    /// Video sources are polled on an interval; still images run once.
    pub fn is_video(self) -> bool {
        matches!(self, DetectionSource::Webcam)
    }
}

impl std::fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionSource::Webcam => write!(f, "webcam"),
            DetectionSource::Upload => write!(f, "upload"),
        }
    }
}

/// Detection runs for a live webcam or for any uploaded image.
pub fn is_detection_active(source: Option<DetectionSource>, webcam_active: bool) -> bool {
    match source {
        Some(DetectionSource::Webcam) => webcam_active,
        Some(DetectionSource::Upload) => true,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, false, false)]
    #[case(None, true, false)]
    #[case(Some(DetectionSource::Webcam), false, false)]
    #[case(Some(DetectionSource::Webcam), true, true)]
    #[case(Some(DetectionSource::Upload), false, true)]
    #[case(Some(DetectionSource::Upload), true, true)]
    fn test_is_detection_active(
        #[case] source: Option<DetectionSource>,
        #[case] webcam_active: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(is_detection_active(source, webcam_active), expected);
    }

    #[test]
    fn test_only_webcam_is_video() {
        assert!(DetectionSource::Webcam.is_video());
        assert!(!DetectionSource::Upload.is_video());
    }
}
