use std::path::PathBuf;

use crate::shared::detection_source::DetectionSource;
use crate::shared::geometry::DisplaySize;

#[derive(Clone, Debug, PartialEq)]
pub struct MediaMetadata {
    pub width: u32,
    pub height: u32,
    /// Capture rate for cameras; 0 for still images.
    pub fps: f64,
    pub source: DetectionSource,
    /// File path or capture device the media was opened from.
    pub location: Option<PathBuf>,
}

impl MediaMetadata {
    pub fn size(&self) -> DisplaySize {
        DisplaySize::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_matches_dimensions() {
        let meta = MediaMetadata {
            width: 1280,
            height: 720,
            fps: 30.0,
            source: DetectionSource::Webcam,
            location: Some(PathBuf::from("/dev/video0")),
        };
        assert_eq!(meta.size(), DisplaySize::new(1280, 720));
    }

    #[test]
    fn test_image_metadata_has_no_rate() {
        let meta = MediaMetadata {
            width: 800,
            height: 600,
            fps: 0.0,
            source: DetectionSource::Upload,
            location: None,
        };
        assert_eq!(meta.fps, 0.0);
        assert!(!meta.source.is_video());
    }
}
