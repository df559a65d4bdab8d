use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use facesense_core::media::infrastructure::camera_reader::default_device;
use facesense_core::pipeline::detection_config::DetectionConfig;
use facesense_core::shared::constants::DETECTION_INTERVAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

impl Appearance {
    pub const ALL: &[Appearance] = &[Appearance::System, Appearance::Dark, Appearance::Light];
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::System => write!(f, "System"),
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

/// Stroke color of the face bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxColor {
    Black,
    White,
    Blue,
    Green,
    Red,
}

impl BoxColor {
    pub const ALL: &[BoxColor] = &[
        BoxColor::Black,
        BoxColor::White,
        BoxColor::Blue,
        BoxColor::Green,
        BoxColor::Red,
    ];

    pub fn rgb(self) -> [u8; 3] {
        match self {
            BoxColor::Black => [0x00, 0x00, 0x00],
            BoxColor::White => [0xff, 0xff, 0xff],
            BoxColor::Blue => [0x25, 0x63, 0xeb],
            BoxColor::Green => [0x16, 0xa3, 0x4a],
            BoxColor::Red => [0xdc, 0x26, 0x26],
        }
    }
}

impl std::fmt::Display for BoxColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoxColor::Black => write!(f, "Black"),
            BoxColor::White => write!(f, "White"),
            BoxColor::Blue => write!(f, "Blue"),
            BoxColor::Green => write!(f, "Green"),
            BoxColor::Red => write!(f, "Red"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub interval_ms: u32,
    /// Percent, 0..=100.
    pub confidence: u32,
    pub draw_landmarks: bool,
    pub box_color: BoxColor,
    pub camera_device: String,
    pub appearance: Appearance,
    pub high_contrast: bool,
    pub font_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval_ms: DETECTION_INTERVAL.as_millis() as u32,
            confidence: 50,
            draw_landmarks: true,
            box_color: BoxColor::Black,
            camera_device: default_device().to_string(),
            appearance: Appearance::System,
            high_contrast: false,
            font_scale: 1.0,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceSense").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Defaults when the file is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            self.save_to(&path);
        }
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    log::warn!("Could not save settings to {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("Could not serialize settings: {e}"),
        }
    }

    pub fn to_detection_config(&self) -> DetectionConfig {
        DetectionConfig {
            interval: Duration::from_millis(self.interval_ms.max(1) as u64),
            confidence: self.confidence.min(100) as f64 / 100.0,
            draw_landmarks: self.draw_landmarks,
            box_color: self.box_color.rgb(),
            ..DetectionConfig::default()
        }
    }

    /// Restores the detection settings, leaving appearance alone.
    pub fn restore_detection_defaults(&mut self) {
        let defaults = Settings::default();
        self.interval_ms = defaults.interval_ms;
        self.confidence = defaults.confidence;
        self.draw_landmarks = defaults.draw_landmarks;
        self.box_color = defaults.box_color;
        self.camera_device = defaults.camera_device;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            interval_ms: 500,
            box_color: BoxColor::Red,
            appearance: Appearance::Dark,
            ..Settings::default()
        };
        settings.save_to(&path);
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"confidence": 70}"#).unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!(settings.confidence, 70);
        assert_eq!(settings.interval_ms, 200);
        assert!(settings.draw_landmarks);
    }

    #[test]
    fn test_default_detection_config_matches_core_default() {
        let config = Settings::default().to_detection_config();
        assert_eq!(config, DetectionConfig::default());
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(50, 0.5)]
    #[case(150, 1.0)]
    fn test_confidence_percent_maps_to_fraction(#[case] percent: u32, #[case] expected: f64) {
        let settings = Settings {
            confidence: percent,
            ..Settings::default()
        };
        assert_eq!(settings.to_detection_config().confidence, expected);
    }

    #[test]
    fn test_restore_detection_defaults_keeps_appearance() {
        let mut settings = Settings {
            interval_ms: 900,
            draw_landmarks: false,
            appearance: Appearance::Light,
            font_scale: 1.3,
            ..Settings::default()
        };
        settings.restore_detection_defaults();
        assert_eq!(settings.interval_ms, 200);
        assert!(settings.draw_landmarks);
        assert_eq!(settings.appearance, Appearance::Light);
        assert_eq!(settings.font_scale, 1.3);
    }
}
