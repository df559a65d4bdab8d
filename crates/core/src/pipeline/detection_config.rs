use std::time::Duration;

use crate::detection::infrastructure::onnx_face_detector::DEFAULT_CONFIDENCE;
use crate::overlay::domain::overlay_renderer::OverlayStyle;
use crate::shared::constants::{DETECTION_INTERVAL, IMAGE_SETTLE_DELAY};

/// Knobs shared by the CLI and the desktop app.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionConfig {
    /// Polling period for video sources.
    pub interval: Duration,
    pub image_settle_delay: Duration,
    /// Minimum detector score, 0..=1.
    pub confidence: f64,
    pub draw_landmarks: bool,
    pub box_color: [u8; 3],
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            interval: DETECTION_INTERVAL,
            image_settle_delay: IMAGE_SETTLE_DELAY,
            confidence: DEFAULT_CONFIDENCE,
            draw_landmarks: true,
            box_color: OverlayStyle::default().box_color,
        }
    }
}

impl DetectionConfig {
    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            box_color: self.box_color,
            draw_landmarks: self.draw_landmarks,
            ..OverlayStyle::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.interval, Duration::from_millis(200));
        assert_eq!(config.box_color, [0, 0, 0]);
        assert!(config.draw_landmarks);
    }

    #[test]
    fn test_overlay_style_carries_overrides() {
        let config = DetectionConfig {
            draw_landmarks: false,
            box_color: [255, 0, 0],
            ..DetectionConfig::default()
        };
        let style = config.overlay_style();
        assert!(!style.draw_landmarks);
        assert_eq!(style.box_color, [255, 0, 0]);
        assert_eq!(style.label_color, OverlayStyle::default().label_color);
    }
}
