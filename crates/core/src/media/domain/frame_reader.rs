use std::path::Path;

use crate::shared::frame::Frame;

use super::media_metadata::MediaMetadata;

/// Reads frames from an image file or a capture device.
///
/// Implementations handle decoding and device access while the pipeline
/// works with the abstract `Frame` and `MediaMetadata` types.
pub trait FrameReader: Send {
    /// Opens the file or device at `location` and returns its metadata.
    fn open(&mut self, location: &Path) -> Result<MediaMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames. Camera streams never end on their own.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the reader.
    fn close(&mut self);
}
